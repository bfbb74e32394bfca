//! X.509 parsing and per-certificate checks.

use chrono::{DateTime, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::ParsedExtension;
use x509_parser::prelude::FromDer as _;

use crate::cert_store::{detect_format, CertificateFormat};
use crate::error::CertError;

/// Fields pulled out of a certificate, owned so the DER buffer can go.
#[derive(Debug, Clone)]
pub(crate) struct CertificateDetails {
    pub subject: String,
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// `Some(bit)` when a key usage extension is present.
    pub digital_signature: Option<bool>,
    /// SubjectPublicKeyInfo DER.
    pub public_key_der: Vec<u8>,
}

impl CertificateDetails {
    pub fn parse(bytes: &[u8]) -> Result<Self, CertError> {
        match detect_format(bytes)? {
            CertificateFormat::Pem => {
                let start = bytes
                    .iter()
                    .position(|b| !b.is_ascii_whitespace())
                    .unwrap_or(0);
                let pem = match x509_parser::pem::parse_x509_pem(&bytes[start..]) {
                    Ok((_, pem)) => pem,
                    Err(e) => return Err(unparsable(format!("invalid PEM: {e}"))),
                };
                if pem.label != "CERTIFICATE" {
                    return Err(unparsable(format!("unexpected PEM label {}", pem.label)));
                }
                Self::from_der(&pem.contents)
            }
            CertificateFormat::Der => Self::from_der(bytes),
        }
    }

    fn from_der(der: &[u8]) -> Result<Self, CertError> {
        let cert = match X509Certificate::from_der(der) {
            Ok((_, cert)) => cert,
            Err(e) => return Err(unparsable(e.to_string())),
        };

        let validity = cert.validity();
        let not_before = to_utc(validity.not_before.timestamp())?;
        let not_after = to_utc(validity.not_after.timestamp())?;

        Ok(Self {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            not_before,
            not_after,
            digital_signature: digital_signature_bit(&cert),
            public_key_der: cert.public_key().raw.to_vec(),
        })
    }

    /// Inclusive validity window check.
    pub fn check_validity(&self, now: DateTime<Utc>) -> Result<(), CertError> {
        if now < self.not_before {
            return Err(CertError::NotYetValid {
                not_before: self.not_before.to_rfc3339(),
            });
        }
        if now > self.not_after {
            return Err(CertError::Expired {
                not_after: self.not_after.to_rfc3339(),
            });
        }
        Ok(())
    }

    /// A certificate without a key usage extension is unrestricted.
    pub fn check_key_usage(&self) -> Result<(), CertError> {
        match self.digital_signature {
            Some(false) => Err(CertError::MissingKeyUsage),
            _ => Ok(()),
        }
    }
}

fn digital_signature_bit(cert: &X509Certificate<'_>) -> Option<bool> {
    for ext in cert.extensions() {
        if let ParsedExtension::KeyUsage(usage) = ext.parsed_extension() {
            return Some(usage.digital_signature());
        }
    }
    None
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>, CertError> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| unparsable(format!("timestamp {timestamp} out of range")))
}

fn unparsable(reason: impl Into<String>) -> CertError {
    CertError::Unparsable {
        reason: reason.into(),
    }
}
