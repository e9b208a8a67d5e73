//! Error types for the PDF OCR gateway.
//!
//! One enum covers the whole request lifecycle. The taxonomy is small on
//! purpose: a request either carried bad input ([`GatewayError::InvalidInput`],
//! mapped to HTTP 400), tripped over the local disk or pdfium
//! ([`GatewayError::Io`] / [`GatewayError::Rasterisation`]), or failed in one
//! of the hosted services ([`GatewayError::Upstream`] /
//! [`GatewayError::Vision`]). Everything except `InvalidInput` surfaces as a
//! 500 with the error's display text in a `{"detail": ...}` body —
//! callers get either a complete result or an error, never a partial one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Gateway-wide result type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// All errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The upload was malformed: missing `file` field, missing filename,
    /// or a filename without a `.pdf` extension.
    #[error("{reason}")]
    InvalidInput { reason: String },

    // ── Local failures ────────────────────────────────────────────────────
    /// Disk write/read failed while spooling or cleaning request artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// pdfium could not open the uploaded document.
    #[error("Cannot open PDF: {detail}")]
    CorruptPdf { detail: String },

    /// pdfium failed while rendering a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    Rasterisation { page: usize, detail: String },

    // ── Hosted-service failures ───────────────────────────────────────────
    /// The vision model returned an error for a page. There is no per-page
    /// retry; the first failing page aborts the whole batch.
    #[error("Vision model failed on page {page}: {detail}")]
    Vision { page: usize, detail: String },

    /// A hosted service (LlamaParse, Mistral, OpenAI transport) failed.
    #[error("{service} error: {detail}")]
    Upstream {
        service: &'static str,
        detail: String,
    },

    // ── Configuration ─────────────────────────────────────────────────────
    /// A required environment variable is missing at startup.
    #[error("Missing required environment variable {name}")]
    MissingEnv { name: &'static str },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (task join failures and the like).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Shorthand for an invalid-input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        GatewayError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Error body: `{"detail": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("rejected request: {}", self);
        }

        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_400() {
        let resp = GatewayError::invalid_input("Only PDF files are allowed.").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_maps_to_500() {
        let resp = GatewayError::Upstream {
            service: "mistral",
            detail: "503 from /v1/ocr".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn vision_display_names_the_page() {
        let e = GatewayError::Vision {
            page: 3,
            detail: "rate limited".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("rate limited"));
    }
}
