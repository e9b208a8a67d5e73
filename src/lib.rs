//! # pdf-ocr-gateway
//!
//! A small HTTP gateway that accepts an uploaded PDF and returns extracted
//! text, using one of three interchangeable backends behind a uniform
//! "PDF in, text out" surface:
//!
//! * **Vision path** (`POST /analyze-pdf/`) — rasterise each page via pdfium
//!   and feed the images to a vision-capable LLM in parallel, recombining
//!   the per-page text in page order with a timing breakdown.
//! * **Parse path** (`POST /llama_ocr/`) — hand the file to LlamaParse
//!   configured for vision-model-backed multimodal parsing and pass its
//!   combined text through.
//! * **OCR path** (`POST /mistral_ocr/`) — upload to Mistral, obtain a
//!   signed URL, request OCR, and join the per-page markdown with blank-line
//!   separators.
//!
//! The three paths are independent request flows sharing only upload intake
//! and per-request scratch-directory handling. All request artifacts (the
//! spooled PDF, rasterised page images) live in an isolated temporary
//! directory that is removed on every exit path.
//!
//! ## Pipeline Overview (vision path)
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Intake  validate .pdf extension, spool bytes to a scratch dir
//!  ├─ 2. Render  rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Encode  PNG → base64 data URL
//!  ├─ 4. Vision  bounded-concurrency calls, order-preserving recombination
//!  └─ 5. Respond combined text + timing breakdown
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_ocr_gateway::{AppState, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Requires OPENAI_API_KEY, MISTRAL_KEY, LLAMA_CLOUD_API_KEY, LLAMA_MODEL
//!     let config = GatewayConfig::from_env()?;
//!     let addr = format!("{}:{}", config.host, config.port);
//!     let state = AppState::new(config, reqwest::Client::new());
//!     let listener = tokio::net::TcpListener::bind(&addr).await?;
//!     axum::serve(listener, pdf_ocr_gateway::router(state)).await?;
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod clients;
pub mod config;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use clients::llama::LlamaParseClient;
pub use clients::mistral::{combine_markdown, MistralOcrClient, OcrPage, OcrResponse};
pub use clients::vision::{OpenAiVision, VisionModel};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use server::{router, AppState};
