//! Signature verification.
//!
//! Checks a decoded message against its signing certificate:
//!
//! 1. Parse the certificate (PEM or DER)
//! 2. Validity window against the clock
//! 3. Issuer and subject via the [`TrustPolicy`]
//! 4. Key usage permits digital signatures (when declared)
//! 5. RSA PKCS#1 v1.5 over the canonical string, SHA-1 for version `1`,
//!    SHA-256 for version `2`
//!
//! Certificate problems surface as [`CertError`], signature problems as
//! [`SigError`].
//!
//! [`CertError`]: crate::error::CertError

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha1::Sha1;
use sha2::Sha256;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{SigError, VerificationFailure};
use crate::types::{NotificationMessage, SignatureVersion};

mod canonical;
mod certificate;
mod trust;

pub use canonical::string_to_sign;
pub use trust::{SnsTrustPolicy, TrustPolicy, DEFAULT_ISSUER_MARKERS, DEFAULT_SUBJECT_DOMAINS};

use certificate::CertificateDetails;

/// Digest paired with RSA PKCS#1 v1.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha1WithRsa,
    Sha256WithRsa,
}

impl SignatureAlgorithm {
    pub fn for_version(version: SignatureVersion) -> Self {
        match version {
            SignatureVersion::V1 => Self::Sha1WithRsa,
            SignatureVersion::V2 => Self::Sha256WithRsa,
        }
    }

    /// Map a raw `SignatureVersion` literal.
    pub fn from_version_str(value: &str) -> Result<Self, SigError> {
        SignatureVersion::from_wire(value)
            .map(Self::for_version)
            .ok_or_else(|| SigError::UnsupportedVersion {
                value: value.to_string(),
            })
    }
}

/// Verifies message signatures against fetched certificates.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    clock: Arc<dyn Clock>,
    policy: Arc<dyn TrustPolicy>,
}

impl SignatureVerifier {
    pub fn new(clock: Arc<dyn Clock>, policy: Arc<dyn TrustPolicy>) -> Self {
        Self { clock, policy }
    }

    /// Verify `message` against `certificate` (PEM or DER bytes).
    ///
    /// Only the `Certificate` and `Signature` failure categories are
    /// returned.
    pub fn verify(
        &self,
        message: &NotificationMessage,
        certificate: &[u8],
    ) -> Result<(), VerificationFailure> {
        let cert = CertificateDetails::parse(certificate)?;
        cert.check_validity(self.clock.now())?;
        self.policy.check_issuer(&cert.issuer)?;
        self.policy.check_subject(&cert.subject)?;
        cert.check_key_usage()?;

        let algorithm = SignatureAlgorithm::for_version(message.signature_version());
        let canonical = string_to_sign(message);

        let result = verify_rsa(
            algorithm,
            &cert.public_key_der,
            canonical.as_bytes(),
            message.signature(),
        );
        match &result {
            Ok(()) => debug!(
                message_id = %message.message_id(),
                algorithm = ?algorithm,
                "signature verified"
            ),
            Err(e) => warn!(
                message_id = %message.message_id(),
                subject = %cert.subject,
                error = %e,
                "signature rejected"
            ),
        }
        result.map_err(VerificationFailure::from)
    }
}

fn verify_rsa(
    algorithm: SignatureAlgorithm,
    public_key_der: &[u8],
    payload: &[u8],
    signature_b64: &str,
) -> Result<(), SigError> {
    let signature_bytes = BASE64.decode(signature_b64).map_err(malformed_signature)?;
    let signature = pkcs1v15::Signature::try_from(signature_bytes.as_slice())
        .map_err(malformed_signature)?;

    let key = match RsaPublicKey::from_public_key_der(public_key_der) {
        Ok(key) => key,
        Err(e) => {
            return Err(SigError::InvalidKey {
                reason: format!("not an RSA public key: {e}"),
            })
        }
    };

    let verified = match algorithm {
        SignatureAlgorithm::Sha1WithRsa => {
            pkcs1v15::VerifyingKey::<Sha1>::new(key).verify(payload, &signature)
        }
        SignatureAlgorithm::Sha256WithRsa => {
            pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(payload, &signature)
        }
    };
    verified.map_err(|_| SigError::Mismatch)
}

fn malformed_signature(err: impl std::fmt::Display) -> SigError {
    SigError::MalformedSignature {
        reason: err.to_string(),
    }
}
