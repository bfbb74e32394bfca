//! Closed-world field schema for notification messages.

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::MessageKind;

pub(crate) const TYPE: &str = "Type";
pub(crate) const MESSAGE_ID: &str = "MessageId";
pub(crate) const TOPIC_ARN: &str = "TopicArn";
pub(crate) const MESSAGE: &str = "Message";
pub(crate) const TIMESTAMP: &str = "Timestamp";
pub(crate) const SIGNATURE_VERSION: &str = "SignatureVersion";
pub(crate) const SIGNATURE: &str = "Signature";
pub(crate) const SIGNING_CERT_URL: &str = "SigningCertURL";
pub(crate) const SUBJECT: &str = "Subject";
pub(crate) const UNSUBSCRIBE_URL: &str = "UnsubscribeURL";
pub(crate) const TOKEN: &str = "Token";
pub(crate) const MESSAGE_ATTRIBUTES: &str = "MessageAttributes";

/// Every field name a message may carry.
pub(crate) const KNOWN_FIELDS: &[&str] = &[
    TYPE,
    MESSAGE_ID,
    TOPIC_ARN,
    MESSAGE,
    TIMESTAMP,
    SIGNATURE_VERSION,
    SIGNATURE,
    SIGNING_CERT_URL,
    SUBJECT,
    UNSUBSCRIBE_URL,
    TOKEN,
    MESSAGE_ATTRIBUTES,
];

/// Required by every message type.
const COMMON_REQUIRED: &[&str] = &[
    TYPE,
    MESSAGE_ID,
    TOPIC_ARN,
    TIMESTAMP,
    SIGNATURE_VERSION,
    SIGNATURE,
    SIGNING_CERT_URL,
];

/// Required on top of [`COMMON_REQUIRED`] for notifications.
const NOTIFICATION_EXTRA: &[&str] = &[MESSAGE];

/// Required on top of [`COMMON_REQUIRED`] for both confirmation types.
const CONFIRMATION_EXTRA: &[&str] = &[MESSAGE, TOKEN];

/// Required field set for a message type, common fields first.
pub(crate) fn required_fields(kind: MessageKind) -> impl Iterator<Item = &'static str> {
    let extra = match kind {
        MessageKind::Notification => NOTIFICATION_EXTRA,
        MessageKind::SubscriptionConfirmation | MessageKind::UnsubscribeConfirmation => {
            CONFIRMATION_EXTRA
        }
    };
    COMMON_REQUIRED.iter().chain(extra).copied()
}

fn is_absent(object: &Map<String, Value>, field: &str) -> bool {
    matches!(object.get(field), None | Some(Value::Null))
}

fn missing_from<'a>(
    object: &Map<String, Value>,
    fields: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    fields
        .into_iter()
        .filter(|f| is_absent(object, f))
        .map(String::from)
        .collect()
}

/// Resolve the message type before anything else is looked at.
///
/// A missing `Type` leaves the kind-specific set unknown, so the common
/// required set is reported instead.
pub(crate) fn message_kind(object: &Map<String, Value>) -> Result<MessageKind, DecodeError> {
    match object.get(TYPE) {
        None | Some(Value::Null) => Err(DecodeError::MissingFields {
            fields: missing_from(object, COMMON_REQUIRED.iter().copied()),
        }),
        Some(Value::String(value)) => match MessageKind::from_wire(value) {
            Some(kind) => Ok(kind),
            None => Err(DecodeError::UnsupportedType {
                value: value.clone(),
            }),
        },
        Some(_) => Err(DecodeError::WrongType {
            field: TYPE.to_string(),
            expected: "string",
        }),
    }
}

/// Check that every required field for `kind` is present and non-null.
pub(crate) fn require_fields(
    object: &Map<String, Value>,
    kind: MessageKind,
) -> Result<(), DecodeError> {
    let missing = missing_from(object, required_fields(kind));
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::MissingFields { fields: missing })
    }
}

/// Reject field names outside [`KNOWN_FIELDS`].
pub(crate) fn reject_unknown_fields(object: &Map<String, Value>) -> Result<(), DecodeError> {
    let unknown: Vec<String> = object
        .keys()
        .filter(|k| !KNOWN_FIELDS.contains(&k.as_str()))
        .cloned()
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::UnknownFields { fields: unknown })
    }
}
