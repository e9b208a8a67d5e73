//! Mistral OCR adapter: upload, signed URL, OCR, markdown combination.
//!
//! The OCR path is three sequential hosted calls:
//!
//! 1. upload the raw PDF bytes with purpose `ocr`;
//! 2. request a short-lived signed URL for the uploaded object;
//! 3. submit that URL for OCR processing with inline image base64 enabled.
//!
//! The response carries one markdown string per page. [`combine_markdown`]
//! joins them with a bit-reproducible rule: exactly one blank line between
//! consecutive pages, in response order, with only the outer whitespace of
//! the joined string trimmed.

use crate::config::{MISTRAL_OCR_MODEL, SIGNED_URL_EXPIRY_HOURS};
use crate::error::{GatewayError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const MISTRAL_API_BASE: &str = "https://api.mistral.ai";

/// One page of an OCR response.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrPage {
    /// Page index as reported by the service.
    pub index: u32,
    /// Extracted page content as markdown.
    pub markdown: String,
}

/// The OCR service's response: an ordered sequence of page objects.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
}

/// Join all pages' markdown with one blank line between consecutive pages,
/// in the order the pages appear in the response (not re-sorted by index),
/// then strip leading/trailing whitespace from the joined string.
///
/// An absent response or one with zero pages yields `""`.
pub fn combine_markdown(response: Option<&OcrResponse>) -> String {
    match response {
        Some(r) if !r.pages.is_empty() => r
            .pages
            .iter()
            .map(|page| page.markdown.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

/// Client for the hosted OCR service.
pub struct MistralOcrClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl MistralOcrClient {
    pub fn new(http: Client, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: MISTRAL_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run the full upload → signed URL → OCR sequence for a spooled PDF.
    pub async fn ocr_file(&self, path: &Path) -> Result<OcrResponse> {
        let uploaded = self.upload(path).await?;
        info!("uploaded file {} for OCR", uploaded.id);
        let signed = self.signed_url(&uploaded.id).await?;
        self.process(&signed.url).await
    }

    /// Upload raw file bytes with a declared purpose of `ocr`.
    async fn upload(&self, path: &Path) -> Result<UploadedFile> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = Form::new()
            .text("purpose", "ocr")
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(format!("{}/v1/files", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        parse_json(response, "file upload").await
    }

    /// Obtain a time-limited signed URL for an uploaded object.
    async fn signed_url(&self, file_id: &str) -> Result<SignedUrl> {
        let response = self
            .http
            .get(format!("{}/v1/files/{file_id}/url", self.base_url))
            .query(&[("expiry", SIGNED_URL_EXPIRY_HOURS)])
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        parse_json(response, "signed url").await
    }

    /// Submit the signed URL for OCR processing.
    async fn process(&self, document_url: &str) -> Result<OcrResponse> {
        let request = OcrRequest {
            model: MISTRAL_OCR_MODEL,
            document: DocumentChunk {
                kind: "document_url",
                document_url,
            },
            include_image_base64: true,
        };

        let response = self
            .http
            .post(format!("{}/v1/ocr", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let parsed: OcrResponse = parse_json(response, "ocr").await?;
        debug!("ocr response: {} pages", parsed.pages.len());
        Ok(parsed)
    }
}

fn upstream(detail: String) -> GatewayError {
    GatewayError::Upstream {
        service: "mistral",
        detail,
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    context: &str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(upstream(format!("{context}: HTTP {status}: {body}")));
    }
    response
        .json()
        .await
        .map_err(|e| upstream(format!("{context}: malformed response: {e}")))
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

#[derive(Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: DocumentChunk<'a>,
    include_image_base64: bool,
}

#[derive(Serialize)]
struct DocumentChunk<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    document_url: &'a str,
}
