//! Message and configuration types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message type, as carried in the `Type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Notification,
    SubscriptionConfirmation,
    UnsubscribeConfirmation,
}

impl MessageKind {
    /// Wire literal for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "Notification",
            Self::SubscriptionConfirmation => "SubscriptionConfirmation",
            Self::UnsubscribeConfirmation => "UnsubscribeConfirmation",
        }
    }

    /// Parse a wire literal. Matching is exact.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "Notification" => Some(Self::Notification),
            "SubscriptionConfirmation" => Some(Self::SubscriptionConfirmation),
            "UnsubscribeConfirmation" => Some(Self::UnsubscribeConfirmation),
            _ => None,
        }
    }

    /// Whether this is one of the confirmation types (which carry a `Token`).
    pub fn is_confirmation(self) -> bool {
        !matches!(self, Self::Notification)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature scheme version, as carried in `SignatureVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureVersion {
    /// SHA1-with-RSA.
    V1,
    /// SHA256-with-RSA.
    V2,
}

impl SignatureVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2 => "2",
        }
    }

    /// Parse a wire literal (`"1"` or `"2"`, nothing else).
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::V1),
            "2" => Some(Self::V2),
            _ => None,
        }
    }
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded notification message.
///
/// Only [`crate::decode_message`] constructs this type, and only from fully
/// validated fields. It exposes read accessors and is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub(crate) message_type: MessageKind,
    pub(crate) message_id: String,
    pub(crate) topic_arn: String,
    pub(crate) message_body: String,
    pub(crate) timestamp: DateTime<Utc>,
    /// `Timestamp` exactly as received; the signature covers these bytes.
    #[serde(skip)]
    pub(crate) timestamp_raw: String,
    pub(crate) signature_version: SignatureVersion,
    pub(crate) signature: String,
    pub(crate) signing_cert_url: String,
    pub(crate) subject: Option<String>,
    pub(crate) unsubscribe_url: Option<String>,
    pub(crate) token: Option<String>,
    pub(crate) message_attributes: BTreeMap<String, String>,
}

impl NotificationMessage {
    pub fn message_type(&self) -> MessageKind {
        self.message_type
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }

    /// The `Message` payload.
    pub fn message_body(&self) -> &str {
        &self.message_body
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The `Timestamp` field as it appeared on the wire.
    pub fn timestamp_str(&self) -> &str {
        &self.timestamp_raw
    }

    pub fn signature_version(&self) -> SignatureVersion {
        self.signature_version
    }

    /// Base64 signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn signing_cert_url(&self) -> &str {
        &self.signing_cert_url
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn unsubscribe_url(&self) -> Option<&str> {
        self.unsubscribe_url.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn message_attributes(&self) -> &BTreeMap<String, String> {
        &self.message_attributes
    }
}

/// Longest certificate cache TTL accepted from configuration (30 days).
pub const MAX_CERT_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// How long a fetched certificate is reused, in seconds.
    #[serde(default = "default_cert_cache_ttl")]
    pub cert_cache_ttl_secs: u64,

    /// Whole-request timeout for certificate fetches, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connect timeout for certificate fetches, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_cert_cache_ttl() -> u64 {
    3600
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            cert_cache_ttl_secs: default_cert_cache_ttl(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl VerifierConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SNS_VERIFY_CERT_TTL_SECS` | Certificate cache TTL (default 3600) |
    /// | `SNS_VERIFY_TIMEOUT_SECS` | Fetch timeout (default 10) |
    /// | `SNS_VERIFY_CONNECT_TIMEOUT_SECS` | Connect timeout (default 5) |
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            cert_cache_ttl_secs: env_u64("SNS_VERIFY_CERT_TTL_SECS")
                .unwrap_or_else(default_cert_cache_ttl),
            timeout_secs: env_u64("SNS_VERIFY_TIMEOUT_SECS")
                .unwrap_or_else(default_timeout),
            connect_timeout_secs: env_u64("SNS_VERIFY_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(default_connect_timeout),
        }
    }

    /// Set the certificate cache TTL.
    pub fn with_cert_cache_ttl(mut self, secs: u64) -> Self {
        self.cert_cache_ttl_secs = secs;
        self
    }

    /// Set the fetch timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Cache TTL, clamped to [`MAX_CERT_CACHE_TTL_SECS`].
    pub fn cert_cache_ttl(&self) -> chrono::Duration {
        let secs = self.cert_cache_ttl_secs.min(MAX_CERT_CACHE_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let value = std::env::var(name).ok()?;
    value.trim().parse().ok()
}
