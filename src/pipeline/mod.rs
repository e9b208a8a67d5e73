//! Vision-path pipeline stages.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! is independently testable and the fan-out logic can be driven by a mock
//! model without touching pdfium or the network.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ render ──▶ encode ──▶ vision
//! (intake)   (pdfium)   (base64)   (fan-out + ordered join)
//! ```
//!
//! 1. [`render`] — rasterise every page into the request's scratch directory;
//!    runs under `spawn_blocking` because pdfium is not async-safe
//! 2. [`encode`] — read each PNG back and base64-wrap it for the API body
//! 3. [`vision`] — bounded-concurrency fan-out with order-preserving
//!    recombination and per-image cleanup

pub mod encode;
pub mod render;
pub mod vision;
