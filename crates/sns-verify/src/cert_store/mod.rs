//! Signing certificate store.
//!
//! Fetches certificates from notification-service hosts over HTTPS and caches
//! them per URL for a fixed TTL. Every check that can fail for a given URL or
//! body runs before the body is cached, so a cache hit never hands back
//! something that failed validation.
//!
//! The lock is never held across a network round-trip. Two concurrent misses
//! for the same URL may both fetch; the later write wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::CertError;

mod content;
mod fetch;
mod hosts;

pub(crate) use content::{detect_format, CertificateFormat};
pub use content::{MAX_NULL_PERCENT, MAX_NULL_RUN, MIN_CERT_BYTES};
pub use fetch::{BodyStream, HttpFetcher, HttpResponse, ReqwestFetcher, USER_AGENT};
pub use hosts::trusted_partition;

/// Largest certificate body accepted (10 KiB).
pub const MAX_CERT_BYTES: usize = 10 * 1024;

/// Certificate bytes that passed retrieval checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedCertificate {
    url: String,
    bytes: Vec<u8>,
}

impl TrustedCertificate {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    certificate: TrustedCertificate,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// TTL cache of signing certificates keyed by URL.
///
/// Clones share the same cache.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    cache: RwLock<HashMap<String, CacheEntry>>,
    fetcher: Arc<dyn HttpFetcher>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl CertificateStore {
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        clock: Arc<dyn Clock>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                cache: RwLock::new(HashMap::new()),
                fetcher,
                clock,
                ttl,
            }),
        }
    }

    /// Certificate bytes for `url`, from cache or freshly fetched.
    ///
    /// The returned vector is a copy; mutating it does not touch the cache.
    pub async fn get_certificate(&self, url: &str) -> Result<Vec<u8>, CertError> {
        let now = self.inner.clock.now();
        {
            let cache = self.inner.cache.read().await;
            if let Some(entry) = cache.get(url) {
                if entry.is_fresh(now) {
                    debug!(url = %url, "certificate cache hit");
                    return Ok(entry.certificate.bytes.clone());
                }
                debug!(
                    url = %url,
                    expired_at = %entry.expires_at,
                    "certificate cache entry expired"
                );
            }
        }

        let parsed = hosts::validate_cert_url(url).map_err(|e| {
            warn!(url = %url, error = %e, "certificate URL rejected");
            e
        })?;

        let partition = parsed
            .host_str()
            .and_then(trusted_partition)
            .unwrap_or("unknown");
        debug!(url = %url, partition, "fetching signing certificate");
        let response = self.inner.fetcher.get(&parsed).await?;
        let body = fetch::read_capped(url, response, MAX_CERT_BYTES)
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "certificate fetch failed");
                e
            })?;

        let format = content::detect_format(&body).map_err(|e| {
            warn!(url = %url, error = %e, "certificate content rejected");
            e
        })?;
        content::check_integrity(&body).map_err(|e| {
            warn!(url = %url, error = %e, "certificate content rejected");
            e
        })?;

        let fingerprint = content::fingerprint(&body);
        let expires_at = self.inner.clock.now() + self.inner.ttl;
        let certificate = TrustedCertificate {
            url: url.to_string(),
            bytes: body,
        };

        {
            let mut cache = self.inner.cache.write().await;
            cache.insert(
                url.to_string(),
                CacheEntry {
                    certificate: certificate.clone(),
                    expires_at,
                },
            );
        }

        info!(
            url = %url,
            sha256 = %fingerprint,
            format = ?format,
            expires_at = %expires_at,
            "cached signing certificate"
        );
        Ok(certificate.bytes)
    }

    /// Whether `url` has an unexpired cache entry.
    pub async fn contains_fresh(&self, url: &str) -> bool {
        let now = self.inner.clock.now();
        let cache = self.inner.cache.read().await;
        cache.get(url).is_some_and(|entry| entry.is_fresh(now))
    }

    /// Drop the entry for `url`. Returns whether one existed.
    pub async fn evict(&self, url: &str) -> bool {
        self.inner.cache.write().await.remove(url).is_some()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        let mut cache = self.inner.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        debug!(dropped, "certificate cache cleared");
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.inner.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
