//! Structural pre-check and field-level validators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

use crate::error::DecodeError;
use crate::types::SignatureVersion;

use super::schema::{MESSAGE_ATTRIBUTES, TOPIC_ARN};

/// Namespace token a topic ARN must contain.
const TOPIC_NAMESPACE: &str = ":sns:";

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        reason: reason.into(),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Cheap shape check run before the JSON parser.
///
/// Braces inside string literals are ignored so payloads that embed JSON
/// text are not rejected.
pub(crate) fn check_structure(trimmed: &str) -> Result<(), DecodeError> {
    if !trimmed.starts_with('{') {
        return Err(malformed("message must start with '{'"));
    }
    if !trimmed.ends_with('}') {
        return Err(malformed("message must end with '}'"));
    }

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in trimmed.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unbalanced braces"))?;
            }
            _ => {}
        }
    }

    if depth != 0 || in_string {
        return Err(malformed("unbalanced braces"));
    }
    Ok(())
}

/// Read an optional string field; `null` counts as absent.
pub(crate) fn optional_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, DecodeError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(DecodeError::WrongType {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

/// Read a mandatory, non-blank string field.
pub(crate) fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, DecodeError> {
    let value = optional_str(object, field)?.ok_or_else(|| DecodeError::MissingFields {
        fields: vec![field.to_string()],
    })?;

    if value.trim().is_empty() {
        return Err(DecodeError::BlankField {
            field: field.to_string(),
        });
    }
    Ok(value)
}

pub(crate) fn topic_arn(value: &str) -> Result<(), DecodeError> {
    if !value.starts_with("arn:") {
        return Err(invalid(TOPIC_ARN, "must start with 'arn:'"));
    }
    if !value.contains(TOPIC_NAMESPACE) {
        return Err(invalid(TOPIC_ARN, "must be an sns topic ARN"));
    }
    Ok(())
}

/// URL fields must be absolute `https` URLs with a host.
pub(crate) fn https_url(field: &str, value: &str) -> Result<(), DecodeError> {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => return Err(invalid(field, format!("not a valid URL: {e}"))),
    };

    if url.scheme() != "https" {
        return Err(invalid(
            field,
            format!("scheme must be https, got {}", url.scheme()),
        ));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid(field, "URL has no host")),
    }
}

pub(crate) fn signature_version(value: &str) -> Result<SignatureVersion, DecodeError> {
    match SignatureVersion::from_wire(value) {
        Some(version) => Ok(version),
        None => Err(DecodeError::UnsupportedSignatureVersion {
            value: value.to_string(),
        }),
    }
}

pub(crate) fn timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| invalid(field, format!("not an ISO-8601 instant: {e}")))
}

/// `MessageAttributes`: optional object of string to string.
pub(crate) fn message_attributes(
    object: &Map<String, Value>,
) -> Result<BTreeMap<String, String>, DecodeError> {
    let attributes = match object.get(MESSAGE_ATTRIBUTES) {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: MESSAGE_ATTRIBUTES.to_string(),
                expected: "object",
            })
        }
    };

    attributes
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.clone(), s.clone())),
            _ => Err(DecodeError::WrongType {
                field: format!("{MESSAGE_ATTRIBUTES}.{key}"),
                expected: "string",
            }),
        })
        .collect()
}
