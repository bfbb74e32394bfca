//! Authenticity verification for push-notification messages.
//!
//! Receivers of notification-service HTTP callbacks must prove a payload was
//! really sent by the service before acting on it. This crate provides:
//!
//! - Strict, closed-schema decoding of the JSON payload
//! - Certificate retrieval restricted to the service's own HTTPS hosts, with
//!   size limits, content heuristics and a TTL cache
//! - X.509 validity, issuer, subject and key-usage checks
//! - RSA signature verification over the canonical string-to-sign
//!   (SHA-1 for signature version `1`, SHA-256 for version `2`)
//!
//! # Quick Start
//!
//! ```no_run
//! use sns_verify::{VerificationPipeline, VerifierConfig};
//!
//! # async fn example(body: &str) -> Result<(), sns_verify::VerificationFailure> {
//! let pipeline = VerificationPipeline::new(VerifierConfig::from_env())?;
//!
//! let message = pipeline.verify_message(body).await?;
//! println!("verified {} from {}", message.message_id(), message.topic_arn());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SNS_VERIFY_CERT_TTL_SECS` | Certificate cache TTL in seconds (default: 3600, max 30 days) |
//! | `SNS_VERIFY_TIMEOUT_SECS` | Certificate fetch timeout in seconds (default: 10) |
//! | `SNS_VERIFY_CONNECT_TIMEOUT_SECS` | Connect timeout in seconds (default: 5) |

pub mod cert_store;
pub mod clock;
pub mod decode;
pub mod error;
pub mod pipeline;
pub mod signature;
pub mod types;

// Re-export main types
pub use cert_store::{
    trusted_partition, BodyStream, CertificateStore, HttpFetcher, HttpResponse, ReqwestFetcher,
    TrustedCertificate, MAX_CERT_BYTES, USER_AGENT,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decode::{decode_message, MAX_MESSAGE_BYTES};
pub use error::{CertError, DecodeError, SigError, VerificationFailure, VerifyResult};
pub use pipeline::{PipelineBuilder, VerificationPipeline};
pub use signature::{
    string_to_sign, SignatureAlgorithm, SignatureVerifier, SnsTrustPolicy, TrustPolicy,
};
pub use types::{MessageKind, NotificationMessage, SignatureVersion, VerifierConfig};
