//! OCI Object Storage REST client.
//!
//! Only `GetObject` and `PutObject` are implemented:
//!
//! ```text
//! GET /n/{namespace}/b/{bucket}/o/{object}
//! PUT /n/{namespace}/b/{bucket}/o/{object}   (content-length required)
//! ```
//!
//! Every request carries a `date` header and an `Authorization` signature
//! from [`RequestSigner`]. Non-success responses are decoded from the
//! service's `{"code": …, "message": …}` error body when possible.

use crate::config::FunctionConfig;
use crate::credential::StorageCredential;
use crate::error::StorageError;
use crate::storage::signer::{http_date_now, RequestSigner};
use crate::storage::{check_length, Connector, ObjectLocation, ObjectStore};
use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, DATE};
use reqwest::{Method, Response, Url};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Path-segment encoding: everything except RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    code: String,
    message: String,
}

/// A signed client for one region/endpoint and one API key.
#[derive(Debug)]
pub struct OciObjectStorageClient {
    http: reqwest::Client,
    endpoint: String,
    signer: RequestSigner,
}

impl OciObjectStorageClient {
    /// Build a client for `endpoint` signing as `credential`.
    ///
    /// # Errors
    /// [`StorageError::Signing`] for an unusable key,
    /// [`StorageError::InvalidEndpoint`] for an endpoint that is not a URL,
    /// [`StorageError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: &str, credential: &StorageCredential) -> Result<Self, StorageError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let parsed = Url::parse(&endpoint).map_err(|e| StorageError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        if parsed.host_str().is_none() {
            return Err(StorageError::InvalidEndpoint {
                endpoint,
                reason: "missing host".to_string(),
            });
        }

        let signer = RequestSigner::new(credential)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("text2pdf-fn/", env!("CARGO_PKG_VERSION")))
            .build()?;

        debug!("Object Storage client for {} as {}", endpoint, signer.key_id());
        Ok(Self {
            http,
            endpoint,
            signer,
        })
    }

    /// Full URL of an object.
    pub fn object_url(&self, location: &ObjectLocation) -> Result<Url, StorageError> {
        let raw = format!(
            "{}/n/{}/b/{}/o/{}",
            self.endpoint,
            utf8_percent_encode(&location.namespace, SEGMENT),
            utf8_percent_encode(&location.bucket, SEGMENT),
            utf8_percent_encode(&location.object_name, SEGMENT),
        );
        Url::parse(&raw).map_err(|e| StorageError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    fn signed(&self, method: Method, url: Url) -> Result<reqwest::RequestBuilder, StorageError> {
        let date = http_date_now();
        let authorization = self.signer.authorization(&method, &url, &date)?;
        Ok(self
            .http
            .request(method, url)
            .header(DATE, date)
            .header(AUTHORIZATION, authorization))
    }
}

#[async_trait]
impl ObjectStore for OciObjectStorageClient {
    async fn fetch(&self, location: &ObjectLocation) -> Result<Bytes, StorageError> {
        let url = self.object_url(location)?;
        debug!("GET {}", url);
        let response = self.signed(Method::GET, url)?.send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?)
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        content: Bytes,
        content_length: u64,
    ) -> Result<(), StorageError> {
        check_length(&content, content_length)?;
        let url = self.object_url(location)?;
        debug!("PUT {} ({} bytes)", url, content_length);
        let response = self
            .signed(Method::PUT, url)?
            .header(CONTENT_LENGTH, content_length)
            .body(content)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into [`StorageError::Service`].
async fn ensure_success(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ServiceErrorBody>(&body) {
        Ok(parsed) => (parsed.code, parsed.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            body,
        ),
    };
    Err(StorageError::Service {
        status: status.as_u16(),
        code,
        message,
    })
}

/// Connects [`OciObjectStorageClient`]s to one endpoint.
#[derive(Debug, Clone)]
pub struct OciConnector {
    endpoint: String,
}

impl OciConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// Connector for the endpoint `config` resolves to.
    pub fn from_config(config: &FunctionConfig) -> Self {
        Self::new(config.object_storage_endpoint())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Connector for OciConnector {
    fn connect(&self, credential: &StorageCredential) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let client = OciObjectStorageClient::new(&self.endpoint, credential)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &[u8] = include_bytes!("../../tests/fixtures/oci_api_key.pem");

    fn credential() -> StorageCredential {
        StorageCredential::new(
            "ocid1.tenancy.oc1..t",
            "ocid1.user.oc1..u",
            "eu-frankfurt-1",
            "aa:bb",
            TEST_KEY.to_vec(),
            "",
        )
    }

    #[test]
    fn object_names_are_percent_encoded() {
        let client = OciObjectStorageClient::new("https://os.example.com/", &credential()).unwrap();
        let url = client
            .object_url(&ObjectLocation::new("ns", "docs", "my notes/q1 report.txt"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://os.example.com/n/ns/b/docs/o/my%20notes%2Fq1%20report.txt"
        );
    }

    #[test]
    fn invalid_endpoint_fails_construction() {
        let err = OciObjectStorageClient::new("not a url", &credential()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn fetch_sends_signed_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/n/ns/b/docs/o/greeting.txt"))
            .and(header_exists("authorization"))
            .and(header_exists("date"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hello World"))
            .expect(1)
            .mount(&server)
            .await;

        let client = OciObjectStorageClient::new(&server.uri(), &credential()).unwrap();
        let body = client
            .fetch(&ObjectLocation::new("ns", "docs", "greeting.txt"))
            .await
            .unwrap();
        assert_eq!(&body[..], b"Hello World");
    }

    #[tokio::test]
    async fn fetch_decodes_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"code":"ObjectNotFound","message":"The object 'missing.txt' was not found in the bucket 'docs'"}"#,
            ))
            .mount(&server)
            .await;

        let client = OciObjectStorageClient::new(&server.uri(), &credential()).unwrap();
        let err = client
            .fetch(&ObjectLocation::new("ns", "docs", "missing.txt"))
            .await
            .unwrap_err();
        match err {
            StorageError::Service { status, code, message } => {
                assert_eq!(status, 404);
                assert_eq!(code, "ObjectNotFound");
                assert!(message.contains("missing.txt"));
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_declares_exact_length() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/n/ns/b/docs/o/greeting.pdf"))
            .and(header("content-length", "4"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = OciObjectStorageClient::new(&server.uri(), &credential()).unwrap();
        client
            .put(
                &ObjectLocation::new("ns", "docs", "greeting.pdf"),
                Bytes::from_static(b"%PDF"),
                4,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn put_rejects_length_mismatch_without_sending() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = OciObjectStorageClient::new(&server.uri(), &credential()).unwrap();
        let err = client
            .put(
                &ObjectLocation::new("ns", "docs", "greeting.pdf"),
                Bytes::from_static(b"%PDF"),
                10,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::LengthMismatch { .. }));
    }
}
