//! Attachment content types accepted by Scaleway TEM

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tem_core::Attachment;

use crate::errors::ScalewayEmailError;
use crate::payload::ScalewayAttachment;

/// Name used for attachments that carry no filename
pub const UNNAMED_ATTACHMENT: &str = "attachment";

pub const ALLOWED_ATTACHMENT_TYPES: &[&str] = &[
    "application/ics",
    "application/pdf",
    "application/pkcs10",
    "application/pkcs7-mime",
    "application/pkcs7-signature",
    "application/vnd.ms-excel",
    "application/vnd.ms-powerpoint",
    "application/vnd.oasis.opendocument.spreadsheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow",
    "application/vnd.openxmlformats-officedocument.presentationml.template",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.template",
    "application/x-pdf",
    "application/xml",
    "image/gif",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/svg+xml",
    "text/calendar",
    "text/csv",
    "text/html",
    "text/plain",
    "text/xml",
];

pub fn is_allowed(mimetype: &str) -> bool {
    ALLOWED_ATTACHMENT_TYPES.contains(&mimetype)
}

/// Check the content type and base64-encode the attachment
pub fn encode_attachment(attachment: &Attachment) -> Result<ScalewayAttachment, ScalewayEmailError> {
    let filename = attachment
        .filename
        .clone()
        .unwrap_or_else(|| UNNAMED_ATTACHMENT.to_string());

    if !is_allowed(&attachment.mimetype) {
        return Err(ScalewayEmailError::DisallowedAttachment {
            filename,
            mimetype: attachment.mimetype.clone(),
        });
    }

    Ok(ScalewayAttachment {
        name: filename,
        content_type: attachment.mimetype.clone(),
        content: STANDARD.encode(&attachment.content),
    })
}
