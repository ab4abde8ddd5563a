//! Email backend delivering through the Scaleway TEM HTTP API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tem_core::{EmailBackend, EmailMessage, MailError, Settings};
use tracing::{debug, error, warn};

use crate::config::ScalewayConfig;
use crate::errors::ScalewayEmailError;
use crate::payload::{build_payload, ScalewayEmailResponse, ScalewaySendEmailRequest};

pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Sends each message with one `POST` to the TEM emails endpoint
#[derive(Debug, Clone)]
pub struct ScalewayBackend {
    client: Client,
    config: ScalewayConfig,
    fail_silently: bool,
}

impl ScalewayBackend {
    pub const NAME: &'static str = "scaleway";

    pub fn new(config: ScalewayConfig, fail_silently: bool) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ScalewayEmailError::from)?;

        Ok(Self {
            client,
            config,
            fail_silently,
        })
    }

    /// Build the backend from settings; fails before any request when credentials are missing
    pub fn from_settings(settings: &Settings, fail_silently: bool) -> Result<Self, MailError> {
        Self::new(ScalewayConfig::from_settings(settings)?, fail_silently)
    }

    pub fn config(&self) -> &ScalewayConfig {
        &self.config
    }

    /// Translate a message without sending it
    pub fn prepare(
        &self,
        message: &EmailMessage,
    ) -> Result<ScalewaySendEmailRequest, ScalewayEmailError> {
        build_payload(message, &self.config.project_id)
    }

    /// Send one request. Anything but `200 OK` is an API error.
    pub async fn post(
        &self,
        payload: &ScalewaySendEmailRequest,
    ) -> Result<ScalewayEmailResponse, ScalewayEmailError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .header(AUTH_HEADER, &self.config.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Failed to send email via Scaleway ({}): {}", status, body);
            return Err(ScalewayEmailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn deliver(&self, messages: &[EmailMessage]) -> Result<usize, ScalewayEmailError> {
        let mut sent = 0;

        for message in messages {
            let payload = self.prepare(message)?;
            debug!(
                "Sending email via Scaleway from {} to {} recipient(s)",
                payload.from.email,
                payload.recipient_count()
            );

            let response = self.post(&payload).await?;
            if response.emails.len() != payload.recipient_count() {
                warn!(
                    "Scaleway reported {} email(s) for {} recipient(s)",
                    response.emails.len(),
                    payload.recipient_count()
                );
            }

            sent += response.emails.len();
        }

        Ok(sent)
    }
}

#[async_trait]
impl EmailBackend for ScalewayBackend {
    async fn send_messages(&self, messages: &[EmailMessage]) -> Result<Option<usize>, MailError> {
        if messages.is_empty() {
            return Ok(None);
        }

        match self.deliver(messages).await {
            Ok(sent) => {
                debug!("Scaleway accepted {} email(s)", sent);
                Ok(Some(sent))
            }
            Err(err) if self.fail_silently => {
                warn!("Ignoring Scaleway delivery failure: {}", err);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn fail_silently(&self) -> bool {
        self.fail_silently
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
