//! String settings consulted by the mail subsystem and its backends

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Selects the backend used by [`crate::BackendRegistry::get_connection`]
pub const EMAIL_BACKEND: &str = "EMAIL_BACKEND";
pub const DEFAULT_FROM_EMAIL: &str = "DEFAULT_FROM_EMAIL";

/// Environment prefixes read by [`Settings::from_env`]
pub const CORE_SETTINGS_PREFIXES: &[&str] = &["EMAIL_", DEFAULT_FROM_EMAIL];

/// Flat key/value settings.
///
/// Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the core mail settings from the process environment
    pub fn from_env() -> Self {
        Self::from_env_prefixed(CORE_SETTINGS_PREFIXES)
    }

    /// Load every environment variable whose name starts with one of `prefixes`
    pub fn from_env_prefixed(prefixes: &[&str]) -> Self {
        Self::from_vars(
            std::env::vars().filter(|(key, _)| prefixes.iter().any(|p| key.starts_with(p))),
        )
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut settings = Self::new();
        for (key, value) in vars {
            settings.set(key, value);
        }
        settings
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder-style [`Settings::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn merge(&mut self, other: Settings) {
        self.values.extend(other.values);
    }
}
