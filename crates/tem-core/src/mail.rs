//! Convenience entry points mirroring the usual `send_mail` helpers

use tracing::debug;

use crate::error::MailError;
use crate::message::EmailMessage;
use crate::registry::BackendRegistry;
use crate::settings::{Settings, DEFAULT_FROM_EMAIL};

/// Sender used when neither the call nor `DEFAULT_FROM_EMAIL` provides one
pub const FALLBACK_FROM_EMAIL: &str = "webmaster@localhost";

/// One entry of a [`send_mass_mail`] batch: subject, body, sender, recipients
pub type MassMailItem = (String, String, Option<String>, Vec<String>);

fn resolve_from(settings: &Settings, from_email: Option<&str>) -> String {
    from_email
        .filter(|from| !from.trim().is_empty())
        .unwrap_or_else(|| settings.get_or(DEFAULT_FROM_EMAIL, FALLBACK_FROM_EMAIL))
        .to_string()
}

/// Send a single plain-text message through the configured backend.
///
/// The backend is built on every call, so configuration errors surface here.
pub async fn send_mail<S: AsRef<str>>(
    registry: &BackendRegistry,
    settings: &Settings,
    subject: &str,
    body: &str,
    from_email: Option<&str>,
    recipient_list: &[S],
    fail_silently: bool,
) -> Result<Option<usize>, MailError> {
    let message = EmailMessage::new(
        subject,
        body,
        resolve_from(settings, from_email),
        recipient_list.iter().map(|r| r.as_ref().to_string()),
    );

    send_messages(registry, settings, &[message], fail_silently).await
}

/// Send several messages over a single connection
pub async fn send_mass_mail<I>(
    registry: &BackendRegistry,
    settings: &Settings,
    datatuple: I,
    fail_silently: bool,
) -> Result<Option<usize>, MailError>
where
    I: IntoIterator<Item = MassMailItem>,
{
    let messages: Vec<EmailMessage> = datatuple
        .into_iter()
        .map(|(subject, body, from_email, recipients)| {
            EmailMessage::new(
                subject,
                body,
                resolve_from(settings, from_email.as_deref()),
                recipients,
            )
        })
        .collect();

    send_messages(registry, settings, &messages, fail_silently).await
}

/// Send prepared messages through the configured backend
pub async fn send_messages(
    registry: &BackendRegistry,
    settings: &Settings,
    messages: &[EmailMessage],
    fail_silently: bool,
) -> Result<Option<usize>, MailError> {
    let backend = registry.get_connection(settings, fail_silently)?;
    debug!(
        "Sending {} message(s) via {} backend",
        messages.len(),
        backend.name()
    );
    backend.send_messages(messages).await
}
