//! Error types shared by the mail subsystem and its backends

use thiserror::Error;

/// Errors raised while configuring a backend or sending through it
#[derive(Error, Debug)]
pub enum MailError {
    /// A required setting is missing or unusable. Raised before any delivery attempt.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    #[error("Unknown email backend: {0}")]
    UnknownBackend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure. Downcast the source to get the concrete type.
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl MailError {
    /// Wrap a backend error
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MailError::Backend(Box::new(err))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, MailError::ImproperlyConfigured(_))
    }

    /// Borrow the backend error as `E`, if that is what this is
    pub fn downcast_backend<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            MailError::Backend(source) => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type alias for mail operations
pub type MailResult<T> = Result<T, MailError>;
