//! Certificate URL policy: HTTPS only, notification-service hosts only.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use url::{Host, Url};

use crate::error::CertError;

/// Host patterns per deployment partition. Matched case-insensitively.
const PARTITION_HOST_PATTERNS: &[(&str, &str)] = &[
    ("aws", r"^sns\.[a-z0-9-]{3,}\.amazonaws\.com$"),
    ("aws-cn", r"^sns\.[a-z0-9-]{3,}\.amazonaws\.com\.cn$"),
    ("aws-iso", r"^sns\.[a-z0-9-]{3,}\.c2s\.ic\.gov$"),
    ("aws-iso-b", r"^sns\.[a-z0-9-]{3,}\.sc2s\.sgov\.gov$"),
    ("aws-iso-e", r"^sns\.[a-z0-9-]{3,}\.cloud\.adc-e\.uk$"),
    ("aws-iso-f", r"^sns\.[a-z0-9-]{3,}\.csp\.hci\.ic\.gov$"),
];

static TRUSTED_HOSTS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    PARTITION_HOST_PATTERNS
        .iter()
        .map(|(partition, pattern)| {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("static host pattern must compile");
            (*partition, re)
        })
        .collect()
});

/// Partition whose host pattern matches `host`, if any.
pub fn trusted_partition(host: &str) -> Option<&'static str> {
    TRUSTED_HOSTS
        .iter()
        .find(|(_, re)| re.is_match(host))
        .map(|(partition, _)| *partition)
}

/// Validate a certificate URL before any network I/O.
pub(crate) fn validate_cert_url(raw: &str) -> Result<Url, CertError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CertError::BlankUrl);
    }

    let url = Url::parse(trimmed).map_err(|e| CertError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "https" {
        return Err(CertError::InsecureScheme {
            url: trimmed.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(other) => {
            return Err(CertError::UntrustedHost {
                host: other.to_string(),
            })
        }
        None => {
            return Err(CertError::InvalidUrl {
                url: trimmed.to_string(),
                reason: "URL has no host".to_string(),
            })
        }
    };

    if trusted_partition(&host).is_none() {
        return Err(CertError::UntrustedHost { host });
    }

    Ok(url)
}
