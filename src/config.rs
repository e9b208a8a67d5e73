//! Configuration for the gateway process.
//!
//! All knobs live in one [`GatewayConfig`] struct, populated once at startup
//! from the environment. The three hosted-service keys are required and their
//! absence fails the process immediately — a missing key discovered on the
//! first request is the worst possible time to learn about it. Everything
//! else has a sensible default and an optional env override.

use crate::error::GatewayError;
use std::env;

/// Default rendering resolution for the vision path.
pub const DEFAULT_DPI: u32 = 300;

/// Default token cap for each per-page vision completion.
pub const DEFAULT_MAX_TOKENS: usize = 500;

/// Default vision model identifier.
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";

/// Mistral OCR model identifier.
pub const MISTRAL_OCR_MODEL: &str = "mistral-ocr-latest";

/// Signed-URL expiry requested from Mistral, in hours.
pub const SIGNED_URL_EXPIRY_HOURS: u32 = 1;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address for the HTTP listener.
    pub host: String,
    /// Bind port for the HTTP listener.
    pub port: u16,

    /// API key for the vision-model service (`OPENAI_API_KEY`).
    pub openai_api_key: String,
    /// API key for the hosted OCR service (`MISTRAL_KEY`).
    pub mistral_api_key: String,
    /// API key for the hosted document parser (`LLAMA_CLOUD_API_KEY`).
    pub llama_api_key: String,
    /// Multimodal model name passed to the hosted parser (`LLAMA_MODEL`).
    pub llama_model: String,

    /// Vision model identifier for per-page extraction.
    pub vision_model: String,
    /// Rasterisation resolution in DPI.
    pub dpi: u32,
    /// Token cap per page completion.
    pub max_tokens: usize,
    /// Concurrent vision calls per request. Defaults to the number of
    /// hardware threads, matching a default-sized worker pool.
    pub concurrency: usize,
}

impl GatewayConfig {
    /// Load configuration from the environment, validating required keys.
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            openai_api_key: required("OPENAI_API_KEY")?,
            mistral_api_key: required("MISTRAL_KEY")?,
            llama_api_key: required("LLAMA_CLOUD_API_KEY")?,
            llama_model: required("LLAMA_MODEL")?,
            vision_model: env::var("VISION_MODEL")
                .unwrap_or_else(|_| DEFAULT_VISION_MODEL.to_string()),
            dpi: env::var("VISION_DPI")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_DPI),
            max_tokens: env::var("VISION_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            concurrency: env::var("VISION_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_concurrency),
        })
    }
}

fn required(name: &'static str) -> Result<String, GatewayError> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(GatewayError::MissingEnv { name }),
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
