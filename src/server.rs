//! HTTP surface: application state, router, and the three extraction
//! endpoints.
//!
//! The three paths share no code beyond upload intake and scratch-file
//! handling; each is a short sequence of save → delegate → combine → clean
//! up. All hosted-service clients live in [`AppState`], built once at
//! startup and shared immutably across requests.

use crate::clients::llama::LlamaParseClient;
use crate::clients::mistral::{self, MistralOcrClient};
use crate::clients::vision::{OpenAiVision, VisionModel};
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::intake;
use crate::pipeline::{render, vision};
use crate::prompts::VISION_EXTRACTION_PROMPT;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Uploads above this size are rejected by the framework before intake runs.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Process-wide shared state: configuration plus the three hosted-service
/// clients, instantiated once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub vision: Arc<dyn VisionModel>,
    pub llama: Arc<LlamaParseClient>,
    pub mistral: Arc<MistralOcrClient>,
}

impl AppState {
    /// Build the production state from configuration and a shared HTTP client.
    pub fn new(config: GatewayConfig, http: reqwest::Client) -> Self {
        let vision = OpenAiVision::new(
            http.clone(),
            config.openai_api_key.clone(),
            config.vision_model.clone(),
            config.max_tokens,
        );
        let llama = LlamaParseClient::new(
            http.clone(),
            config.llama_api_key.clone(),
            config.llama_model.clone(),
        );
        let mistral = MistralOcrClient::new(http, config.mistral_api_key.clone());

        Self {
            config: Arc::new(config),
            vision: Arc::new(vision),
            llama: Arc::new(llama),
            mistral: Arc::new(mistral),
        }
    }

    /// Swap the vision model, e.g. for a scripted model in tests.
    pub fn with_vision(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.vision = model;
        self
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze-pdf/", post(analyze_pdf))
        .route("/llama_ocr/", post(llama_ocr))
        .route("/mistral_ocr/", post(mistral_ocr))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Response bodies ──────────────────────────────────────────────────────

/// Vision-path response: combined text plus the timing breakdown.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub combined_output: String,
    #[serde(flatten)]
    pub timings: vision::VisionTimings,
}

/// Parse-path response.
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub parsed_text: String,
}

/// OCR-path response.
#[derive(Debug, Serialize)]
pub struct OcrPathResponse {
    pub combined_text: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────

/// Vision path: rasterise the upload and run each page through the vision
/// model in parallel, recombining in page order.
async fn analyze_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>> {
    let start = Instant::now();

    let doc = intake::receive_pdf(&mut multipart).await?;
    let scratch = intake::spool(&doc).await?;

    let pages = render::render_pages(scratch.pdf_path(), scratch.dir(), state.config.dpi).await?;
    // The spooled PDF is no longer needed once rasterised.
    tokio::fs::remove_file(scratch.pdf_path()).await.ok();
    let extract_final = start.elapsed().as_secs_f64();

    let vision_start = Instant::now();
    let combined_output = vision::extract_pages(
        &state.vision,
        &pages,
        VISION_EXTRACTION_PROMPT,
        state.config.concurrency,
    )
    .await?;
    let vision_time = vision_start.elapsed().as_secs_f64();

    let timings = vision::VisionTimings {
        total_time: start.elapsed().as_secs_f64(),
        vision_time,
        extract_final,
    };
    info!(
        "analyzed '{}': {} pages in {:.2}s",
        doc.filename,
        pages.len(),
        timings.total_time
    );

    // `scratch` drops here, removing any remaining request artifacts.
    Ok(Json(AnalyzeResponse {
        combined_output,
        timings,
    }))
}

/// Parse path: hand the file to the hosted multimodal parser and pass its
/// combined text through.
async fn llama_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResponse>> {
    let doc = intake::receive_pdf(&mut multipart).await?;
    let scratch = intake::spool(&doc).await?;

    let parsed_text = state
        .llama
        .parse_file(scratch.pdf_path(), &doc.filename)
        .await?;

    info!("parsed '{}' via llamaparse", doc.filename);
    Ok(Json(ParseResponse { parsed_text }))
}

/// OCR path: upload → signed URL → OCR, then join the per-page markdown.
async fn mistral_ocr(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrPathResponse>> {
    let doc = intake::receive_pdf(&mut multipart).await?;
    let scratch = intake::spool(&doc).await?;

    let response = state.mistral.ocr_file(scratch.pdf_path()).await?;
    let combined_text = mistral::combine_markdown(Some(&response));

    info!(
        "ocr'd '{}': {} pages via mistral",
        doc.filename,
        response.pages.len()
    );
    Ok(Json(OcrPathResponse { combined_text }))
}
