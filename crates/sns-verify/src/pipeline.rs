//! End-to-end verification: decode, fetch certificate, verify signature.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cert_store::{CertificateStore, HttpFetcher, ReqwestFetcher};
use crate::clock::{Clock, SystemClock};
use crate::decode::decode_message;
use crate::error::{VerificationFailure, VerifyResult};
use crate::signature::{SignatureVerifier, SnsTrustPolicy, TrustPolicy};
use crate::types::{NotificationMessage, VerifierConfig};

/// Verifies raw notification payloads.
///
/// Holds the certificate cache; clones share it. Construct one per process
/// (or per tenant) and reuse it.
#[derive(Debug, Clone)]
pub struct VerificationPipeline {
    store: CertificateStore,
    verifier: SignatureVerifier,
}

impl VerificationPipeline {
    /// Pipeline with the reqwest fetcher, system clock and default trust
    /// policy.
    pub fn new(config: VerifierConfig) -> VerifyResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: VerifierConfig) -> PipelineBuilder {
        PipelineBuilder {
            config,
            fetcher: None,
            clock: None,
            policy: None,
        }
    }

    /// Decode `raw`, fetch its signing certificate and verify the signature.
    ///
    /// Returns the decoded message only when every stage passes. No retries
    /// are attempted; see [`VerificationFailure::is_retryable`].
    pub async fn verify_message(&self, raw: &str) -> VerifyResult<NotificationMessage> {
        let message = decode_message(raw).map_err(|e| {
            debug!(error = %e, "message decode failed");
            VerificationFailure::from(e)
        })?;

        let certificate = self
            .store
            .get_certificate(message.signing_cert_url())
            .await
            .map_err(|e| {
                warn!(
                    message_id = %message.message_id(),
                    url = %message.signing_cert_url(),
                    error = %e,
                    "signing certificate unavailable"
                );
                VerificationFailure::from(e)
            })?;

        self.verifier.verify(&message, &certificate)?;

        info!(
            message_id = %message.message_id(),
            message_type = %message.message_type(),
            topic_arn = %message.topic_arn(),
            "message verified"
        );
        Ok(message)
    }

    /// Drop every cached certificate.
    pub async fn clear_cache(&self) {
        self.store.clear().await;
    }

    /// Number of cached certificates, expired entries included.
    pub async fn cache_size(&self) -> usize {
        self.store.len().await
    }

    pub fn certificate_store(&self) -> &CertificateStore {
        &self.store
    }
}

/// Builder for [`VerificationPipeline`].
#[derive(Debug)]
pub struct PipelineBuilder {
    config: VerifierConfig,
    fetcher: Option<Arc<dyn HttpFetcher>>,
    clock: Option<Arc<dyn Clock>>,
    policy: Option<Arc<dyn TrustPolicy>>,
}

impl PipelineBuilder {
    /// Replace the HTTP transport.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn HttpFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_trust_policy(mut self, policy: Arc<dyn TrustPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn build(self) -> VerifyResult<VerificationPipeline> {
        let fetcher: Arc<dyn HttpFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ReqwestFetcher::new(&self.config).map_err(|e| {
                VerificationFailure::unexpected("failed to create HTTP client", e)
            })?),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let policy: Arc<dyn TrustPolicy> = match self.policy {
            Some(policy) => policy,
            None => Arc::new(SnsTrustPolicy::default()),
        };

        debug!(
            cert_cache_ttl_secs = self.config.cert_cache_ttl().num_seconds(),
            timeout_secs = self.config.timeout_secs,
            "verification pipeline configured"
        );

        Ok(VerificationPipeline {
            store: CertificateStore::new(fetcher, clock.clone(), self.config.cert_cache_ttl()),
            verifier: SignatureVerifier::new(clock, policy),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CertError, DecodeError};

    #[tokio::test]
    async fn test_new_starts_with_empty_cache() {
        let pipeline = VerificationPipeline::new(VerifierConfig::default()).unwrap();
        assert_eq!(pipeline.cache_size().await, 0);
    }

    #[tokio::test]
    async fn test_decode_failure_short_circuits() {
        let pipeline = VerificationPipeline::new(VerifierConfig::default()).unwrap();

        let err = pipeline.verify_message("not json").await.unwrap_err();
        assert!(matches!(
            err,
            VerificationFailure::Decode(DecodeError::Malformed { .. })
        ));
        assert_eq!(pipeline.cache_size().await, 0);
    }

    #[tokio::test]
    async fn test_untrusted_cert_url_is_certificate_failure() {
        let pipeline = VerificationPipeline::new(VerifierConfig::default()).unwrap();
        let raw = serde_json::json!({
            "Type": "Notification",
            "MessageId": "m-1",
            "TopicArn": "arn:aws:sns:us-east-1:123456789012:t",
            "Message": "hello",
            "Timestamp": "2024-01-01T00:00:00.000Z",
            "SignatureVersion": "1",
            "Signature": "c2ln",
            "SigningCertURL": "https://attacker.example.com/cert.pem"
        })
        .to_string();

        let err = pipeline.verify_message(&raw).await.unwrap_err();
        assert!(matches!(
            err,
            VerificationFailure::Certificate(CertError::UntrustedHost { .. })
        ));
        assert_eq!(err.exit_code(), 3);
    }
}
