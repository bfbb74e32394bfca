//! HTTP seam for certificate retrieval.
//!
//! The store talks to [`HttpFetcher`] rather than to reqwest directly, so tests
//! can count fetches and serve bodies from memory. Bodies are pulled chunk by
//! chunk and reading stops as soon as the size cap is crossed.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::CertError;
use crate::types::VerifierConfig;

/// User-Agent sent with certificate requests.
pub const USER_AGENT: &str = concat!("sns-verify/", env!("CARGO_PKG_VERSION"));

/// Incrementally readable response body.
#[async_trait]
pub trait BodyStream: Send {
    /// Next chunk, or `None` once the body is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, CertError>;
}

/// Status line and body of a certificate response.
pub struct HttpResponse {
    pub status: u16,
    /// Declared `Content-Length`, when the server sent one.
    pub content_length: Option<u64>,
    pub body: Box<dyn BodyStream>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Issues GET requests for certificate URLs.
///
/// Implementations report transport failures as [`CertError::Network`] and
/// must not follow redirects.
#[async_trait]
pub trait HttpFetcher: Send + Sync + fmt::Debug {
    async fn get(&self, url: &Url) -> Result<HttpResponse, CertError>;
}

/// Production fetcher backed by reqwest with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Build a client with the configured timeouts and redirects disabled.
    pub fn new(config: &VerifierConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client. The caller is responsible for its redirect
    /// and timeout settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse, CertError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        Ok(HttpResponse {
            status: response.status().as_u16(),
            content_length: response.content_length(),
            body: Box::new(ReqwestBody {
                url: url.clone(),
                response,
            }),
        })
    }
}

struct ReqwestBody {
    url: Url,
    response: reqwest::Response,
}

#[async_trait]
impl BodyStream for ReqwestBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, CertError> {
        match self.response.chunk().await {
            Ok(chunk) => Ok(chunk.map(|bytes| bytes.to_vec())),
            Err(e) => Err(network_error(&self.url, &e)),
        }
    }
}

fn network_error(url: &Url, err: &reqwest::Error) -> CertError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    CertError::Network {
        url: url.to_string(),
        message,
    }
}

/// Read a successful response body, enforcing `limit` as it streams in.
pub(crate) async fn read_capped(
    url: &str,
    mut response: HttpResponse,
    limit: usize,
) -> Result<Vec<u8>, CertError> {
    if !(200..300).contains(&response.status) {
        return Err(CertError::Http {
            url: url.to_string(),
            status: response.status,
        });
    }

    if let Some(declared) = response.content_length {
        if declared > limit as u64 {
            return Err(CertError::BodyTooLarge { limit });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.body.next_chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(CertError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    if body.is_empty() {
        return Err(CertError::EmptyBody);
    }
    Ok(body)
}
