//! Outgoing mail contract for Tem
//!
//! This crate defines what a delivery backend receives and returns:
//! - [`EmailMessage`] and its attachments and alternatives
//! - the [`EmailBackend`] trait and an in-memory implementation
//! - [`Settings`] and the [`BackendRegistry`] that turns them into a backend
//! - `send_mail` style helpers

pub mod backend;
pub mod error;
pub mod mail;
pub mod message;
pub mod registry;
pub mod settings;

pub use backend::{EmailBackend, MemoryBackend, MemoryPlugin, Outbox};
pub use error::{MailError, MailResult};
pub use mail::{send_mail, send_mass_mail, send_messages, MassMailItem};
pub use message::{Alternative, Attachment, EmailAddress, EmailMessage};
pub use registry::{BackendFactory, BackendRegistry, MailPlugin};
pub use settings::Settings;

// Re-export for backend implementations
pub use async_trait;
