//! Error types for the verification pipeline.
//!
//! Failures fall into three non-overlapping categories, one per stage:
//! decoding the message, obtaining and vetting the signing certificate, and
//! checking the signature itself. [`VerificationFailure`] wraps them without
//! changing their meaning.

use std::error::Error as StdError;

/// Message decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Raw input exceeds the size limit.
    #[error("message too large: {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Input failed the structural pre-check.
    #[error("malformed message: {reason}")]
    Malformed { reason: String },

    /// JSON parser rejected the input.
    #[error("invalid JSON: {reason}")]
    InvalidJson { reason: String },

    /// Top-level value is an empty object.
    #[error("message object is empty")]
    EmptyObject,

    /// `Type` is not one of the known message types.
    #[error("unsupported message type: {value}")]
    UnsupportedType { value: String },

    /// Required fields are absent or `null`.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Field names outside the known schema.
    #[error("unknown fields: {}", fields.join(", "))]
    UnknownFields { fields: Vec<String> },

    /// A mandatory field is empty or whitespace.
    #[error("field {field} must not be blank")]
    BlankField { field: String },

    /// A field has the wrong JSON type.
    #[error("field {field} must be a JSON {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    /// A field failed semantic validation.
    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// `SignatureVersion` is not a supported literal.
    #[error("unsupported signature version: {value}")]
    UnsupportedSignatureVersion { value: String },
}

/// Certificate retrieval and certificate validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CertError {
    /// Certificate URL is empty.
    #[error("certificate URL is blank")]
    BlankUrl,

    /// Certificate URL does not parse.
    #[error("invalid certificate URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Certificate URL is not HTTPS.
    #[error("certificate URL must use https, got {scheme}: {url}")]
    InsecureScheme { url: String, scheme: String },

    /// Host is outside the trusted domain patterns.
    #[error("certificate host is not trusted: {host}")]
    UntrustedHost { host: String },

    /// Server answered with a non-success status.
    #[error("certificate fetch failed: HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    /// Transport failure (connect, timeout, reset).
    #[error("certificate fetch failed for {url}: {message}")]
    Network { url: String, message: String },

    /// Response body exceeds the size cap.
    #[error("certificate body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// Response body is empty.
    #[error("certificate body is empty")]
    EmptyBody,

    /// Bytes are neither PEM nor plausible DER.
    #[error("malformed certificate: {reason}")]
    Malformed { reason: String },

    /// Bytes tripped the null-byte heuristics.
    #[error("suspicious certificate content: {reason}")]
    SuspiciousContent { reason: String },

    /// X.509 parser rejected the certificate.
    #[error("unable to parse certificate: {reason}")]
    Unparsable { reason: String },

    /// Certificate `notAfter` is in the past.
    #[error("certificate expired at {not_after}")]
    Expired { not_after: String },

    /// Certificate `notBefore` is in the future.
    #[error("certificate not valid before {not_before}")]
    NotYetValid { not_before: String },

    /// Issuer is not a known notification-service authority.
    #[error("certificate issuer is not trusted: {issuer}")]
    UntrustedIssuer { issuer: String },

    /// Subject does not name the notification service.
    #[error("certificate subject is not trusted: {subject}")]
    UntrustedSubject { subject: String },

    /// Key usage extension lacks `digitalSignature`.
    #[error("certificate key usage does not permit digital signatures")]
    MissingKeyUsage,
}

impl CertError {
    /// Whether a later attempt could succeed without any input changing.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Signature verification errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigError {
    /// Signature version has no algorithm mapping.
    #[error("unsupported signature version: {value}")]
    UnsupportedVersion { value: String },

    /// `Signature` is not valid base64.
    #[error("malformed signature: {reason}")]
    MalformedSignature { reason: String },

    /// Certificate public key is not a usable RSA key.
    #[error("invalid public key: {reason}")]
    InvalidKey { reason: String },

    /// Signature does not match the canonical string.
    #[error("signature does not match message content")]
    Mismatch,
}

/// Failure of a full `verify_message` call.
#[derive(Debug, thiserror::Error)]
pub enum VerificationFailure {
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("certificate rejected: {0}")]
    Certificate(#[from] CertError),

    #[error("signature rejected: {0}")]
    Signature(#[from] SigError),

    /// Programming or environment failure.
    #[error("unexpected error: {message}")]
    Unexpected {
        message: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl VerificationFailure {
    pub(crate) fn unexpected(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Unexpected {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Decode(_) => 1,
            Self::Unexpected { .. } => 2,
            Self::Certificate(_) => 3,
            Self::Signature(_) => 4,
        }
    }

    /// Whether the caller may retry the whole call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Certificate(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Result type for pipeline operations.
pub type VerifyResult<T> = Result<T, VerificationFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_per_category() {
        let decode = VerificationFailure::from(DecodeError::EmptyObject);
        assert_eq!(decode.exit_code(), 1);
        let cert = VerificationFailure::from(CertError::BlankUrl);
        assert_eq!(cert.exit_code(), 3);
        let sig = VerificationFailure::from(SigError::Mismatch);
        assert_eq!(sig.exit_code(), 4);

        let io = std::io::Error::other("boom");
        let err = VerificationFailure::unexpected("client setup", io);
        assert_eq!(err.exit_code(), 2);
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_retryable_only_for_transient_fetch_failures() {
        let network = CertError::Network {
            url: "https://sns.us-east-1.amazonaws.com/a.pem".to_string(),
            message: "timed out".to_string(),
        };
        assert!(VerificationFailure::from(network).is_retryable());

        let unavailable = CertError::Http {
            url: "https://sns.us-east-1.amazonaws.com/a.pem".to_string(),
            status: 503,
        };
        assert!(unavailable.is_retryable());

        let not_found = CertError::Http {
            url: "https://sns.us-east-1.amazonaws.com/a.pem".to_string(),
            status: 404,
        };
        assert!(!not_found.is_retryable());

        let mismatch = VerificationFailure::from(SigError::Mismatch);
        assert!(!mismatch.is_retryable());
        let empty = VerificationFailure::from(CertError::EmptyBody);
        assert!(!empty.is_retryable());
    }

    #[test]
    fn test_missing_fields_message_lists_all() {
        let err = DecodeError::MissingFields {
            fields: vec!["Token".to_string(), "Message".to_string()],
        };
        assert_eq!(err.to_string(), "missing required fields: Token, Message");
    }
}
