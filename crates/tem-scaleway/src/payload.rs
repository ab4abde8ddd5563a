//! Scaleway TEM wire types and the message → request translation

use serde::{Deserialize, Serialize};
use tem_core::{EmailAddress, EmailMessage};

use crate::attachments::encode_attachment;
use crate::errors::ScalewayEmailError;

pub const REPLY_TO_HEADER: &str = "Reply-To";

/// Body of `POST /regions/{region}/emails`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalewaySendEmailRequest {
    pub project_id: String,
    pub from: ScalewayEmailAddress,
    pub to: Vec<ScalewayEmailAddress>,
    pub cc: Vec<ScalewayEmailAddress>,
    pub bcc: Vec<ScalewayEmailAddress>,
    pub subject: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub additional_headers: Vec<ScalewayHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<ScalewayAttachment>>,
}

impl ScalewaySendEmailRequest {
    /// Number of addressed recipients across to, cc and bcc
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalewayEmailAddress {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<EmailAddress> for ScalewayEmailAddress {
    fn from(address: EmailAddress) -> Self {
        Self {
            email: address.email,
            name: address.name,
        }
    }
}

fn address(raw: &str) -> ScalewayEmailAddress {
    EmailAddress::parse(raw).into()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalewayHeader {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalewayAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    /// Base64 encoded content
    pub content: String,
}

/// Response of a successful send: one record per addressed recipient
#[derive(Debug, Clone, Deserialize)]
pub struct ScalewayEmailResponse {
    #[serde(default)]
    pub emails: Vec<ScalewayEmailInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScalewayEmailInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub rcpt_to: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Translate a message into a TEM send request.
///
/// Reply-to addresses become `Reply-To` entries after the extra headers. Fails on
/// the first attachment whose content type is not allowed.
pub fn build_payload(
    message: &EmailMessage,
    project_id: &str,
) -> Result<ScalewaySendEmailRequest, ScalewayEmailError> {
    let mut additional_headers: Vec<ScalewayHeader> = message
        .extra_headers
        .iter()
        .map(|(key, value)| ScalewayHeader {
            key: key.clone(),
            value: value.clone(),
        })
        .collect();

    additional_headers.extend(message.reply_to.iter().map(|email| ScalewayHeader {
        key: REPLY_TO_HEADER.to_string(),
        value: email.clone(),
    }));

    let attachments = if message.attachments.is_empty() {
        None
    } else {
        Some(
            message
                .attachments
                .iter()
                .map(encode_attachment)
                .collect::<Result<Vec<_>, _>>()?,
        )
    };

    Ok(ScalewaySendEmailRequest {
        project_id: project_id.to_string(),
        from: address(&message.from_email),
        to: message.to.iter().map(|r| address(r)).collect(),
        cc: message.cc.iter().map(|r| address(r)).collect(),
        bcc: message.bcc.iter().map(|r| address(r)).collect(),
        subject: message.subject.clone(),
        text: message.body.clone(),
        html: message.html_alternative().map(str::to_string),
        additional_headers,
        attachments,
    })
}
