//! Certificate byte checks run before anything is cached.
//!
//! These are cheap shape and tamper heuristics. They do not replace X.509
//! parsing, which happens at verification time.

use sha2::{Digest, Sha256};

use crate::error::CertError;

/// Shortest body that can plausibly hold a certificate.
pub const MIN_CERT_BYTES: usize = 100;

/// Reject when more than this percentage of bytes are `0x00`.
pub const MAX_NULL_PERCENT: usize = 10;

/// Reject when a run of consecutive `0x00` bytes is longer than this.
pub const MAX_NULL_RUN: usize = 50;

pub(crate) const PEM_MARKER: &[u8] = b"-----BEGIN CERTIFICATE-----";

/// Certificate encoding detected from leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CertificateFormat {
    Pem,
    Der,
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

/// Identify PEM or DER, or reject as malformed.
pub(crate) fn detect_format(bytes: &[u8]) -> Result<CertificateFormat, CertError> {
    if bytes.len() < MIN_CERT_BYTES {
        return Err(CertError::Malformed {
            reason: format!(
                "{} bytes is below the {MIN_CERT_BYTES}-byte minimum",
                bytes.len()
            ),
        });
    }

    if skip_ascii_whitespace(bytes).starts_with(PEM_MARKER) {
        return Ok(CertificateFormat::Pem);
    }

    // DER SEQUENCE: tag 0x30, then a short-form length or a long-form
    // length with 1-4 length octets.
    match bytes {
        [0x30, len, ..] if *len < 0x80 || (0x81..=0x84).contains(len) => {
            Ok(CertificateFormat::Der)
        }
        _ => Err(CertError::Malformed {
            reason: "neither a PEM certificate nor a DER sequence".to_string(),
        }),
    }
}

/// Null-byte tamper heuristics.
pub(crate) fn check_integrity(bytes: &[u8]) -> Result<(), CertError> {
    let mut nulls = 0usize;
    let mut run = 0usize;
    let mut longest_run = 0usize;

    for &b in bytes {
        if b == 0 {
            nulls += 1;
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
    }

    if nulls * 100 > bytes.len() * MAX_NULL_PERCENT {
        return Err(CertError::SuspiciousContent {
            reason: format!("{nulls} of {} bytes are null", bytes.len()),
        });
    }
    if longest_run > MAX_NULL_RUN {
        return Err(CertError::SuspiciousContent {
            reason: format!("null byte run of {longest_run} exceeds {MAX_NULL_RUN}"),
        });
    }
    Ok(())
}

/// Lowercase hex SHA-256 of the certificate bytes, for logs.
pub(crate) fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
