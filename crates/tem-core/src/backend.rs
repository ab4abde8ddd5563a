//! Delivery backend trait and the in-memory backend

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use crate::error::MailError;
use crate::message::EmailMessage;
use crate::registry::{BackendRegistry, MailPlugin};

/// A delivery backend for outgoing mail.
///
/// `send_messages` returns the number of recipient-level deliveries, `None` when
/// there was nothing to send or when a failure was swallowed because the backend was
/// opened with `fail_silently`.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    async fn send_messages(&self, messages: &[EmailMessage]) -> Result<Option<usize>, MailError>;

    fn fail_silently(&self) -> bool;

    /// Registry name of the backend
    fn name(&self) -> &'static str;
}

/// Messages captured by [`MemoryBackend`]
pub type Outbox = Arc<Mutex<Vec<EmailMessage>>>;

/// Backend that keeps messages in memory instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    outbox: Outbox,
    fail_silently: bool,
}

impl MemoryBackend {
    pub const NAME: &'static str = "memory";

    pub fn new(fail_silently: bool) -> Self {
        Self::with_outbox(Outbox::default(), fail_silently)
    }

    pub fn with_outbox(outbox: Outbox, fail_silently: bool) -> Self {
        Self {
            outbox,
            fail_silently,
        }
    }

    /// Snapshot of everything sent so far
    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.outbox).clone()
    }
}

fn lock(outbox: &Outbox) -> std::sync::MutexGuard<'_, Vec<EmailMessage>> {
    outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl EmailBackend for MemoryBackend {
    async fn send_messages(&self, messages: &[EmailMessage]) -> Result<Option<usize>, MailError> {
        if messages.is_empty() {
            return Ok(None);
        }

        let count = messages.iter().map(|m| m.recipients().len()).sum();
        lock(&self.outbox).extend(messages.iter().cloned());
        debug!(
            "Captured {} message(s) for {} recipient(s) in memory",
            messages.len(),
            count
        );

        Ok(Some(count))
    }

    fn fail_silently(&self) -> bool {
        self.fail_silently
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// Registers [`MemoryBackend`] with a shared outbox
#[derive(Debug, Clone, Default)]
pub struct MemoryPlugin {
    outbox: Outbox,
}

impl MemoryPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent through any connection created by this plugin
    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.outbox).clone()
    }

    pub fn clear(&self) {
        lock(&self.outbox).clear();
    }
}

impl MailPlugin for MemoryPlugin {
    fn name(&self) -> &'static str {
        MemoryBackend::NAME
    }

    fn register(&self, registry: &mut BackendRegistry) {
        let outbox = self.outbox.clone();
        registry.register(MemoryBackend::NAME, move |_settings, fail_silently| {
            Ok(Box::new(MemoryBackend::with_outbox(
                outbox.clone(),
                fail_silently,
            )))
        });
    }
}
