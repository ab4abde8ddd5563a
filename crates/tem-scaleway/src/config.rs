//! Scaleway backend configuration read from [`Settings`]

use std::fmt;
use std::time::Duration;

use tem_core::{MailError, Settings};

pub const API_VERSION: &str = "v1alpha1";
pub const DEFAULT_REGION: &str = "fr-par";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment prefix shared by every setting below
pub const SETTINGS_PREFIX: &str = "SCALEWAY_EMAIL_";
pub const PROJECT_ID_SETTING: &str = "SCALEWAY_EMAIL_PROJECT_ID";
pub const API_KEY_SETTING: &str = "SCALEWAY_EMAIL_API_KEY";
pub const API_URL_SETTING: &str = "SCALEWAY_EMAIL_API_URL";
pub const REGION_SETTING: &str = "SCALEWAY_EMAIL_REGION";
pub const TIMEOUT_SETTING: &str = "SCALEWAY_EMAIL_TIMEOUT";

/// Emails endpoint for a region
pub fn default_api_url(region: &str) -> String {
    format!(
        "https://api.scaleway.com/transactional-email/{}/regions/{}/emails",
        API_VERSION, region
    )
}

#[derive(Clone, PartialEq, Eq)]
pub struct ScalewayConfig {
    pub project_id: String,
    pub api_key: String,
    pub api_url: String,
    pub timeout: Duration,
}

// The API key never shows up in logs
impl fmt::Debug for ScalewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalewayConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ScalewayConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            api_url: default_api_url(DEFAULT_REGION),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point the backend at another endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the configuration, failing on a missing project id or API key.
    ///
    /// An explicit `SCALEWAY_EMAIL_API_URL` wins over the region.
    pub fn from_settings(settings: &Settings) -> Result<Self, MailError> {
        let project_id = required(settings, PROJECT_ID_SETTING)?;
        let api_key = required(settings, API_KEY_SETTING)?;

        let api_url = match settings.get(API_URL_SETTING) {
            Some(url) => url.to_string(),
            None => default_api_url(settings.get_or(REGION_SETTING, DEFAULT_REGION)),
        };

        let timeout = match settings.get(TIMEOUT_SETTING) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(MailError::ImproperlyConfigured(format!(
                        "{} must be a positive number of seconds, got {:?}",
                        TIMEOUT_SETTING, raw
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            project_id,
            api_key,
            api_url,
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn required(settings: &Settings, key: &str) -> Result<String, MailError> {
    settings
        .get(key)
        .map(str::to_string)
        .ok_or_else(|| MailError::ImproperlyConfigured(format!("{} is required", key)))
}
