//! Email message model handed to delivery backends

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MailError;

pub const DEFAULT_ATTACHMENT_MIMETYPE: &str = "application/octet-stream";
pub const HTML_MIMETYPE: &str = "text/html";

/// A mailbox: an address with an optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl EmailAddress {
    /// Parse `Name <user@example.com>` or a bare `user@example.com`.
    ///
    /// Anything that does not look like the angle-bracket form is kept whole as the
    /// address, so parsing never fails.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let (Some(open), true) = (raw.rfind('<'), raw.ends_with('>')) {
            let email = raw[open + 1..raw.len() - 1].trim().to_string();
            let name = raw[..open].trim().trim_matches('"').trim();
            return Self {
                email,
                name: (!name.is_empty()).then(|| name.to_string()),
            };
        }

        Self {
            email: raw.to_string(),
            name: None,
        }
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

/// Alternative rendering of the body (e.g. HTML)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub content: String,
    pub mimetype: String,
}

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: Option<String>,
    pub content: Vec<u8>,
    pub mimetype: String,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            filename: Some(filename.into()),
            content: content.into(),
            mimetype: mimetype.into(),
        }
    }

    /// Read an attachment from disk, guessing its type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MailError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let mimetype = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_ATTACHMENT_MIMETYPE)
            .to_string();

        Ok(Self {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            content,
            mimetype,
        })
    }
}

/// A complete outgoing message.
///
/// Recipients are kept as raw strings; backends decide how to parse them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from_email: String,
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: String,
    /// Plain text body
    pub body: String,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub reply_to: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    pub fn new<I, S>(
        subject: impl Into<String>,
        body: impl Into<String>,
        from_email: impl Into<String>,
        to: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from_email: from_email.into(),
            to: to.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn attach_alternative(
        mut self,
        content: impl Into<String>,
        mimetype: impl Into<String>,
    ) -> Self {
        self.alternatives.push(Alternative {
            content: content.into(),
            mimetype: mimetype.into(),
        });
        self
    }

    /// Every addressee: to, then cc, then bcc
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .collect()
    }

    /// Content of the first `text/html` alternative
    pub fn html_alternative(&self) -> Option<&str> {
        self.alternatives
            .iter()
            .find(|alt| alt.mimetype == HTML_MIMETYPE)
            .map(|alt| alt.content.as_str())
    }
}
