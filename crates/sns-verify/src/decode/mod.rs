//! Message decoding.
//!
//! Turns an untrusted JSON payload into a [`NotificationMessage`]. Decoding is
//! all-or-nothing: the first violation aborts with a [`DecodeError`] naming the
//! offending field, and no partially decoded message ever escapes.
//!
//! # Checks, in order
//!
//! 1. Size limit ([`MAX_MESSAGE_BYTES`])
//! 2. Structural pre-check (braces)
//! 3. JSON parse, non-empty object
//! 4. `Type` resolved to a [`MessageKind`]
//! 5. Required fields for that kind (all missing ones reported together)
//! 6. Closed-world schema (unknown field names rejected)
//! 7. Per-field types and semantics

use serde_json::Value;

use crate::error::DecodeError;
use crate::types::NotificationMessage;

mod schema;
mod validate;


use schema::{
    MESSAGE, MESSAGE_ID, SIGNATURE, SIGNATURE_VERSION, SIGNING_CERT_URL, SUBJECT, TIMESTAMP, TOKEN,
    TOPIC_ARN, UNSUBSCRIBE_URL,
};

/// Largest raw message accepted (256 KiB).
pub const MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// Decode and validate a raw notification message.
pub fn decode_message(raw: &str) -> Result<NotificationMessage, DecodeError> {
    if raw.len() > MAX_MESSAGE_BYTES {
        return Err(DecodeError::TooLarge {
            size: raw.len(),
            limit: MAX_MESSAGE_BYTES,
        });
    }

    let trimmed = raw.trim();
    validate::check_structure(trimmed)?;

    let value: Value = serde_json::from_str(trimmed).map_err(|e| DecodeError::InvalidJson {
        reason: e.to_string(),
    })?;

    let object = match value {
        Value::Object(object) => object,
        _ => {
            return Err(DecodeError::Malformed {
                reason: "top-level value must be an object".to_string(),
            })
        }
    };
    if object.is_empty() {
        return Err(DecodeError::EmptyObject);
    }

    let kind = schema::message_kind(&object)?;
    schema::require_fields(&object, kind)?;
    schema::reject_unknown_fields(&object)?;

    let message_id = validate::required_str(&object, MESSAGE_ID)?;
    let message_body = validate::required_str(&object, MESSAGE)?;

    let topic_arn = validate::required_str(&object, TOPIC_ARN)?;
    validate::topic_arn(topic_arn)?;

    let timestamp_raw = validate::required_str(&object, TIMESTAMP)?;
    let timestamp = validate::timestamp(TIMESTAMP, timestamp_raw)?;

    let version_raw = validate::required_str(&object, SIGNATURE_VERSION)?;
    let signature_version = validate::signature_version(version_raw)?;
    let signature = validate::required_str(&object, SIGNATURE)?;

    let signing_cert_url = validate::required_str(&object, SIGNING_CERT_URL)?;
    validate::https_url(SIGNING_CERT_URL, signing_cert_url)?;

    let unsubscribe_url = validate::optional_str(&object, UNSUBSCRIBE_URL)?;
    if let Some(url) = unsubscribe_url {
        validate::https_url(UNSUBSCRIBE_URL, url)?;
    }

    let token = if kind.is_confirmation() {
        Some(validate::required_str(&object, TOKEN)?)
    } else {
        validate::optional_str(&object, TOKEN)?
    };

    let subject = validate::optional_str(&object, SUBJECT)?;
    let message_attributes = validate::message_attributes(&object)?;

    Ok(NotificationMessage {
        message_type: kind,
        message_id: message_id.to_string(),
        topic_arn: topic_arn.to_string(),
        message_body: message_body.to_string(),
        timestamp,
        timestamp_raw: timestamp_raw.to_string(),
        signature_version,
        signature: signature.to_string(),
        signing_cert_url: signing_cert_url.to_string(),
        subject: subject.map(String::from),
        unsubscribe_url: unsubscribe_url.map(String::from),
        token: token.map(String::from),
        message_attributes,
    })
}
