//! Endpoint-level tests over a real local listener.
//!
//! These exercise intake validation through the full axum stack without
//! touching pdfium or any hosted service: every request here is rejected
//! before a backend call could happen.

use pdf_ocr_gateway::{
    router, AppState, GatewayConfig, LlamaParseClient, MistralOcrClient, OpenAiVision,
};
use reqwest::multipart::{Form, Part};
use std::net::SocketAddr;
use std::sync::Arc;

/// Nothing listens here; any hosted-service call fails fast with a
/// transport error instead of leaving the test machine.
const UNROUTABLE_BASE: &str = "http://127.0.0.1:9";

fn test_config() -> GatewayConfig {
    GatewayConfig {
        host: "127.0.0.1".into(),
        port: 0,
        openai_api_key: "test-key".into(),
        mistral_api_key: "test-key".into(),
        llama_api_key: "test-key".into(),
        llama_model: "test-model".into(),
        vision_model: "gpt-4o".into(),
        dpi: 300,
        max_tokens: 500,
        concurrency: 2,
    }
}

/// Serve the router on an ephemeral port and return its address.
///
/// Every hosted-service client is pointed at an unroutable base URL so the
/// suite stays hermetic: no request here may reach a real API host.
async fn spawn_gateway() -> SocketAddr {
    let http = reqwest::Client::new();
    let mut state = AppState::new(test_config(), http.clone());
    state.vision = Arc::new(
        OpenAiVision::new(http.clone(), "test-key".into(), "gpt-4o".into(), 500)
            .with_base_url(UNROUTABLE_BASE),
    );
    state.llama = Arc::new(
        LlamaParseClient::new(http.clone(), "test-key".into(), "test-model".into())
            .with_base_url(UNROUTABLE_BASE),
    );
    state.mistral =
        Arc::new(MistralOcrClient::new(http, "test-key".into()).with_base_url(UNROUTABLE_BASE));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

fn upload_form(filename: &str, bytes: &'static [u8]) -> Form {
    Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()))
}

#[tokio::test]
async fn non_pdf_upload_is_rejected_with_400() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();

    // The body is not a valid PDF; a 400 here means intake rejected the
    // request before rasterisation was ever attempted.
    let response = client
        .post(format!("http://{addr}/analyze-pdf/"))
        .multipart(upload_form("report.txt", b"plain text, not a pdf"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Only PDF files are allowed.");
}

#[tokio::test]
async fn extension_check_applies_to_all_three_paths() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();

    for endpoint in ["/analyze-pdf/", "/llama_ocr/", "/mistral_ocr/"] {
        let response = client
            .post(format!("http://{addr}{endpoint}"))
            .multipart(upload_form("scan.jpeg", b"not a pdf"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "endpoint {endpoint}");
    }
}

#[tokio::test]
async fn missing_file_field_is_rejected_with_400() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();

    let form = Form::new().text("document", "there is no file part");
    let response = client
        .post(format!("http://{addr}/analyze-pdf/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["detail"].as_str().unwrap().contains("file"),
        "detail should name the missing field: {body}"
    );
}

#[tokio::test]
async fn uppercase_pdf_extension_passes_intake() {
    let addr = spawn_gateway().await;
    let client = reqwest::Client::new();

    // Intake accepts the filename; the upload then fails against the
    // unroutable OCR host — but not with the intake 400.
    let response = client
        .post(format!("http://{addr}/mistral_ocr/"))
        .multipart(upload_form("CLAIM.PDF", b"garbage bytes"))
        .send()
        .await
        .unwrap();

    assert_ne!(response.status(), 400);
}
