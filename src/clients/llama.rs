//! LlamaParse adapter: hosted multimodal document parsing.
//!
//! The parse path hands the whole PDF to LlamaParse configured for
//! vision-model-backed multimodal parsing and returns the service's combined
//! document text. The flow is the service's standard job protocol:
//! upload → poll job status → fetch the text result. Concatenation order is
//! whatever the service returns; the gateway does not re-sort.

use crate::error::{GatewayError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

const LLAMA_API_BASE: &str = "https://api.cloud.llamaindex.ai";

/// Seconds between job-status polls.
const POLL_INTERVAL_SECS: u64 = 1;

/// Give up after this many polls so a wedged job cannot pin a request
/// forever.
const MAX_POLLS: u32 = 300;

/// Client for the hosted document-parsing service.
pub struct LlamaParseClient {
    http: Client,
    api_key: String,
    /// Vendor multimodal model name forwarded with every parse job.
    model: String,
    base_url: String,
}

impl LlamaParseClient {
    pub fn new(http: Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
            base_url: LLAMA_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Parse a spooled PDF and return the service's combined text.
    pub async fn parse_file(&self, path: &Path, filename: &str) -> Result<String> {
        let job = self.submit(path, filename).await?;
        info!("llama parse job {} submitted", job.id);
        self.await_job(&job.id).await?;
        self.fetch_text(&job.id).await
    }

    /// Upload the file and open a parse job.
    async fn submit(&self, path: &Path, filename: &str) -> Result<ParseJob> {
        let bytes = tokio::fs::read(path).await?;
        let file_part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| GatewayError::Internal(format!("multipart part: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("use_vendor_multimodal_model", "true")
            .text("vendor_multimodal_model_name", self.model.clone());

        let response = self
            .http
            .post(format!("{}/api/v1/parsing/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        parse_json(response, "upload").await
    }

    /// Poll the job until it reaches a terminal state.
    async fn await_job(&self, job_id: &str) -> Result<()> {
        for _ in 0..MAX_POLLS {
            let response = self
                .http
                .get(format!("{}/api/v1/parsing/job/{job_id}", self.base_url))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| upstream(e.to_string()))?;

            let job: ParseJob = parse_json(response, "job status").await?;
            debug!("llama parse job {}: {}", job_id, job.status);

            match job.status.as_str() {
                "SUCCESS" => return Ok(()),
                "ERROR" | "CANCELED" => {
                    return Err(upstream(format!(
                        "parse job {job_id} ended in state {}",
                        job.status
                    )));
                }
                _ => sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await,
            }
        }

        Err(upstream(format!(
            "parse job {job_id} did not complete within {} polls",
            MAX_POLLS
        )))
    }

    /// Fetch the combined text result of a finished job.
    async fn fetch_text(&self, job_id: &str) -> Result<String> {
        let response = self
            .http
            .get(format!(
                "{}/api/v1/parsing/job/{job_id}/result/text",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| upstream(e.to_string()))?;

        let result: ParseResult = parse_json(response, "result").await?;
        Ok(result.text)
    }
}

fn upstream(detail: String) -> GatewayError {
    GatewayError::Upstream {
        service: "llamaparse",
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
struct ParseJob {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ParseResult {
    text: String,
}
