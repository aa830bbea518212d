//! Whole-function tests against a mock Object Storage endpoint.
//!
//! Each test stages the fixture API key in a temporary key directory,
//! points the converter at a wiremock server and inspects both the
//! reported result and the requests the server received.

use std::path::Path;
use tempfile::TempDir;
use text2pdf::{Converter, FunctionConfig, OperationResult};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &[u8] = include_bytes!("fixtures/oci_api_key.pem");
const KEY_NAME: &str = "oci_api_key.pem";

// ── Test helpers ─────────────────────────────────────────────────────────────

struct Harness {
    key_dir: TempDir,
    scratch_dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        init_tracing();
        let key_dir = tempfile::tempdir().unwrap();
        std::fs::write(key_dir.path().join(KEY_NAME), TEST_KEY).unwrap();
        Self {
            key_dir,
            scratch_dir: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self, endpoint: &str) -> FunctionConfig {
        FunctionConfig::builder()
            .tenancy_id("ocid1.tenancy.oc1..tenant")
            .user_id("ocid1.user.oc1..user")
            .region("eu-frankfurt-1")
            .fingerprint("20:3b:97:13:55:1c:aa:66:00:11:22:33:44:55:66:77")
            .private_key_name(KEY_NAME)
            .namespace("ns")
            .bucket("docs")
            .key_dir(self.key_dir.path())
            .scratch_dir(self.scratch_dir.path())
            .endpoint(endpoint)
            .build()
    }

    fn scratch_is_empty(&self) -> bool {
        dir_is_empty(self.scratch_dir.path())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

fn failure_message(result: &OperationResult) -> String {
    match result {
        OperationResult::Failure(resp) => resp.message.clone(),
        other => panic!("expected failure, got {other:?}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn converts_text_object_into_pdf_next_to_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/n/ns/b/docs/o/greeting.txt"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hello World"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/n/ns/b/docs/o/greeting.pdf"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new();
    let converter = Converter::new(harness.config(&server.uri()));
    let result = converter.handle(b"greeting.txt").await;

    assert_eq!(
        result,
        OperationResult::Success {
            message: "PDF greeting.pdf written to storage bucket - docs".to_string()
        }
    );
    assert_eq!(
        result.to_bytes(),
        b"PDF greeting.pdf written to storage bucket - docs".to_vec()
    );

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .expect("a PUT request");
    let declared: usize = put
        .headers
        .get("content-length")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(declared, put.body.len());

    let pdf = lopdf::Document::load_mem(&put.body).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);

    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn signature_covers_date_target_and_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let harness = Harness::new();
    let result = Converter::new(harness.config(&server.uri()))
        .handle(b"notes.txt")
        .await;
    assert!(result.is_success(), "{result:?}");

    for request in server.received_requests().await.unwrap() {
        assert!(request.headers.get("date").is_some());
        let auth = request
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(auth.starts_with("Signature version=\"1\""), "{auth}");
        assert!(auth.contains(
            "keyId=\"ocid1.tenancy.oc1..tenant/ocid1.user.oc1..user/20:3b:97:13:55:1c:aa:66:00:11:22:33:44:55:66:77\""
        ));
        assert!(auth.contains("algorithm=\"rsa-sha256\""));
        assert!(auth.contains("headers=\"date (request-target) host\""));
    }
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let server = MockServer::start().await;
    let harness = Harness::new();
    let config = FunctionConfig {
        private_key_name: "absent.pem".to_string(),
        ..harness.config(&server.uri())
    };

    let result = Converter::new(config).handle(b"greeting.txt").await;

    assert_eq!(failure_message(&result), "Unable to read private Key");
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn empty_payload_reports_bucket() {
    let server = MockServer::start().await;
    let harness = Harness::new();

    let result = Converter::new(harness.config(&server.uri())).handle(b"").await;

    assert_eq!(
        failure_message(&result),
        "File name empty. Pass name of a valid .txt file in bucket - docs"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_object_stops_before_render() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "ObjectNotFound",
            "message": "The object 'missing.txt' was not found in the bucket 'docs'"
        })))
        .mount(&server)
        .await;

    let harness = Harness::new();
    let result = Converter::new(harness.config(&server.uri()))
        .handle(b"missing.txt")
        .await;

    assert_eq!(
        failure_message(&result),
        "Could not read file missing.txt from bucket docs"
    );
    let OperationResult::Failure(resp) = &result else {
        unreachable!()
    };
    assert!(resp.error.contains("ObjectNotFound"), "{}", resp.error);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn rejected_upload_still_removes_scratch_pdf() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("line one\nline two\n"))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new();
    let result = Converter::new(harness.config(&server.uri()))
        .handle(b"lines.txt")
        .await;

    assert_eq!(failure_message(&result), "Failed to write PDF to bucket");
    let bytes = result.to_bytes();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["Message"], "Failed to write PDF to bucket");
    assert!(harness.scratch_is_empty());
}
