//! Error types for the Scaleway backend

use tem_core::MailError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScalewayEmailError {
    #[error("Attachment {filename} has a disallowed content type: {mimetype}")]
    DisallowedAttachment { filename: String, mimetype: String },

    #[error("Scaleway API Error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Scaleway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid Scaleway response: {0}")]
    InvalidResponse(String),
}

impl ScalewayEmailError {
    /// HTTP status returned by the API, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ScalewayEmailError::Api { status, .. } => Some(*status),
            ScalewayEmailError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ScalewayEmailError> for MailError {
    fn from(err: ScalewayEmailError) -> Self {
        MailError::backend(err)
    }
}

impl From<serde_json::Error> for ScalewayEmailError {
    fn from(err: serde_json::Error) -> Self {
        ScalewayEmailError::InvalidResponse(err.to_string())
    }
}
