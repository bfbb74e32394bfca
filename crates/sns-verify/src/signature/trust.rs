//! Issuer and subject trust rules.
//!
//! This is a bounded, pattern-based check on distinguished names, not a chain
//! build. Names are matched in the `KEY=value, ...` form produced by the X.509
//! parser.

use std::fmt;

use crate::error::CertError;

/// Decides whether a certificate's names belong to the notification service.
pub trait TrustPolicy: Send + Sync + fmt::Debug {
    fn check_issuer(&self, issuer: &str) -> Result<(), CertError>;

    fn check_subject(&self, subject: &str) -> Result<(), CertError>;
}

/// Issuer organisations that have signed notification-service certificates.
pub const DEFAULT_ISSUER_MARKERS: &[&str] = &[
    "O=Amazon",
    "O=DigiCert Inc",
    "O=Symantec Corporation",
    "O=VeriSign, Inc.",
];

/// Domains the certificate subject may name, one per partition family.
pub const DEFAULT_SUBJECT_DOMAINS: &[&str] = &[
    "amazonaws.com",
    "c2s.ic.gov",
    "sc2s.sgov.gov",
    "cloud.adc-e.uk",
    "csp.hci.ic.gov",
];

/// Default policy for notification-service certificates.
///
/// * issuer must contain one of the issuer markers (case-sensitive)
/// * subject must mention `sns` and one of the subject domains
///   (case-insensitive)
#[derive(Debug, Clone)]
pub struct SnsTrustPolicy {
    issuer_markers: Vec<String>,
    subject_domains: Vec<String>,
}

impl Default for SnsTrustPolicy {
    fn default() -> Self {
        Self {
            issuer_markers: owned(DEFAULT_ISSUER_MARKERS),
            subject_domains: owned(DEFAULT_SUBJECT_DOMAINS),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SnsTrustPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also trust issuers containing `marker`, e.g. `O=Example CA`.
    pub fn with_issuer_marker(mut self, marker: impl Into<String>) -> Self {
        self.issuer_markers.push(marker.into());
        self
    }

    /// Also accept subjects naming `domain`.
    pub fn with_subject_domain(mut self, domain: impl Into<String>) -> Self {
        self.subject_domains.push(domain.into().to_ascii_lowercase());
        self
    }
}

impl TrustPolicy for SnsTrustPolicy {
    fn check_issuer(&self, issuer: &str) -> Result<(), CertError> {
        let trusted = self
            .issuer_markers
            .iter()
            .any(|m| issuer.contains(m.as_str()));

        if trusted {
            Ok(())
        } else {
            Err(CertError::UntrustedIssuer {
                issuer: issuer.to_string(),
            })
        }
    }

    fn check_subject(&self, subject: &str) -> Result<(), CertError> {
        let lowered = subject.to_ascii_lowercase();
        let names_domain = self
            .subject_domains
            .iter()
            .any(|d| lowered.contains(d.as_str()));

        if lowered.contains("sns") && names_domain {
            Ok(())
        } else {
            Err(CertError::UntrustedSubject {
                subject: subject.to_string(),
            })
        }
    }
}
