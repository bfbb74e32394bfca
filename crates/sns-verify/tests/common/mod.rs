//! Shared fixtures: an RSA signing key, certificates minted with rcgen over
//! that key, signed messages and an in-memory certificate fetcher.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, TimeZone, Utc};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, KeyUsagePurpose, RemoteKeyPair};
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde_json::{json, Map, Value};
use sha1::Sha1;
use sha2::Sha256;
use url::Url;

use sns_verify::{
    BodyStream, CertError, HttpFetcher, HttpResponse, ManualClock, VerificationPipeline,
    VerifierConfig,
};

pub const CERT_URL: &str =
    "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-0000000000000000000000.pem";

pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:orders";

/// 1024-bit keeps debug-build key generation fast.
pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        RsaPrivateKey::new(&mut rng, 1024).expect("keygen")
    })
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Certificates
// ---------------------------------------------------------------------------

/// rcgen signer backed by the shared `rsa` key.
struct RsaRemoteKey {
    public_pkcs1: Vec<u8>,
}

impl RemoteKeyPair for RsaRemoteKey {
    fn public_key(&self) -> &[u8] {
        &self.public_pkcs1
    }

    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, rcgen::Error> {
        let signer = SigningKey::<Sha256>::new(signing_key().clone());
        Ok(signer.sign(msg).to_vec())
    }

    fn algorithm(&self) -> &'static rcgen::SignatureAlgorithm {
        &rcgen::PKCS_RSA_SHA256
    }
}

fn remote_key_pair() -> KeyPair {
    let public_pkcs1 = signing_key()
        .to_public_key()
        .to_pkcs1_der()
        .expect("PKCS#1 encoding")
        .as_bytes()
        .to_vec();
    let remote = Box::new(RsaRemoteKey { public_pkcs1 });
    KeyPair::from_remote(remote).expect("remote key")
}

/// Knobs for a self-signed test certificate.
#[derive(Debug, Clone)]
pub struct CertSpec {
    pub organization: String,
    pub common_name: String,
    pub not_before: (i32, u8, u8),
    pub not_after: (i32, u8, u8),
    pub key_usages: Vec<KeyUsagePurpose>,
}

impl Default for CertSpec {
    fn default() -> Self {
        Self {
            organization: "Amazon".to_string(),
            common_name: "sns.amazonaws.com".to_string(),
            not_before: (2020, 1, 1),
            not_after: (2030, 1, 1),
            key_usages: vec![KeyUsagePurpose::DigitalSignature],
        }
    }
}

/// Self-signed, so issuer and subject share the distinguished name.
pub fn certificate(spec: &CertSpec) -> rcgen::Certificate {
    let names = vec![spec.common_name.clone()];
    let mut params = CertificateParams::new(names).expect("params");

    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, spec.organization.as_str());
    dn.push(DnType::CommonName, spec.common_name.as_str());
    params.distinguished_name = dn;

    let (y, m, d) = spec.not_before;
    params.not_before = rcgen::date_time_ymd(y, m, d);
    let (y, m, d) = spec.not_after;
    params.not_after = rcgen::date_time_ymd(y, m, d);
    params.key_usages = spec.key_usages.clone();

    let key_pair = remote_key_pair();
    params.self_signed(&key_pair).expect("self-signed")
}

pub fn certificate_pem(spec: &CertSpec) -> Vec<u8> {
    certificate(spec).pem().into_bytes()
}

pub fn certificate_der(spec: &CertSpec) -> Vec<u8> {
    certificate(spec).der().to_vec()
}

pub fn sns_certificate_pem() -> Vec<u8> {
    certificate_pem(&CertSpec::default())
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Unsigned notification fields.
pub fn notification_fields(version: &str) -> Map<String, Value> {
    let value = json!({
        "Type": "Notification",
        "MessageId": "22b80b92-fdea-4c2c-8f9d-bdfb0c7bf324",
        "TopicArn": TOPIC_ARN,
        "Subject": "Order placed",
        "Message": "{\"order\":42,\"status\":\"placed\"}",
        "Timestamp": "2024-06-01T11:59:30.123Z",
        "SignatureVersion": version,
        "SigningCertURL": CERT_URL,
        "UnsubscribeURL": "https://sns.us-east-1.amazonaws.com/?Action=Unsubscribe&SubscriptionArn=orders-1",
        "MessageAttributes": { "tenant": "acme" }
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Unsigned subscription confirmation fields.
pub fn confirmation_fields(version: &str) -> Map<String, Value> {
    let mut fields = notification_fields(version);
    fields.insert("Type".into(), json!("SubscriptionConfirmation"));
    fields.insert("Token".into(), json!("2336412f37fb687f5d51e6e2425f004ae"));
    fields.insert(
        "Message".into(),
        json!("You have chosen to subscribe to the topic. To confirm, visit the SubscribeURL."),
    );
    fields.remove("Subject");
    fields.remove("UnsubscribeURL");
    fields.remove("MessageAttributes");
    fields
}

/// Canonical string built independently of the library.
pub fn canonical(fields: &Map<String, Value>) -> String {
    let mut out = String::new();
    let order = [
        "Message",
        "MessageId",
        "Subject",
        "Timestamp",
        "TopicArn",
        "Type",
    ];
    for name in order {
        if let Some(Value::String(value)) = fields.get(name) {
            out.push_str(name);
            out.push('\n');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

/// Base64 RSA signature over `payload` for the given signature version.
pub fn sign_payload(payload: &[u8], version: &str) -> String {
    let key = signing_key().clone();
    let bytes = match version {
        "1" => SigningKey::<Sha1>::new(key).sign(payload).to_vec(),
        _ => SigningKey::<Sha256>::new(key).sign(payload).to_vec(),
    };
    BASE64.encode(bytes)
}

/// Sign `fields` with the shared key and serialize to JSON.
pub fn sign(mut fields: Map<String, Value>) -> String {
    let version = fields
        .get("SignatureVersion")
        .and_then(Value::as_str)
        .unwrap_or("2")
        .to_string();
    let signature = sign_payload(canonical(&fields).as_bytes(), &version);
    fields.insert("Signature".into(), Value::String(signature));
    Value::Object(fields).to_string()
}

pub fn signed_notification(version: &str) -> String {
    sign(notification_fields(version))
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

struct MemoryBody(VecDeque<Vec<u8>>);

#[async_trait]
impl BodyStream for MemoryBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, CertError> {
        Ok(self.0.pop_front())
    }
}

/// Serves certificate bodies from memory and counts requests.
///
/// Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serving(url: &str, body: Vec<u8>) -> Arc<Self> {
        let fetcher = Self::new();
        fetcher.serve(url, body);
        fetcher
    }

    pub fn serve(&self, url: &str, body: Vec<u8>) {
        self.bodies.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpFetcher for MemoryFetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse, CertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.bodies.lock().unwrap().get(url.as_str()).cloned();
        let (status, body) = match body {
            Some(body) => (200, body),
            None => (404, Vec::new()),
        };
        let chunks = body.chunks(512).map(<[u8]>::to_vec).collect();
        Ok(HttpResponse {
            status,
            content_length: None,
            body: Box::new(MemoryBody(chunks)),
        })
    }
}

/// Pipeline over `fetcher` with a manual clock at [`now`].
pub fn pipeline(fetcher: Arc<MemoryFetcher>) -> (VerificationPipeline, ManualClock) {
    pipeline_with_config(fetcher, VerifierConfig::default())
}

pub fn pipeline_with_config(
    fetcher: Arc<MemoryFetcher>,
    config: VerifierConfig,
) -> (VerificationPipeline, ManualClock) {
    let clock = ManualClock::new(now());
    let pipeline = VerificationPipeline::builder(config)
        .with_fetcher(fetcher)
        .with_clock(Arc::new(clock.clone()))
        .build()
        .expect("pipeline");
    (pipeline, clock)
}
