//! Clients for the three hosted document-processing services.
//!
//! Each client wraps exactly the request/response contract the service
//! documents, shares the process-wide `reqwest::Client`, and is constructed
//! once at startup. The clients are stateless per call, so they are safe to
//! hold behind `Arc` across requests.

pub mod llama;
pub mod mistral;
pub mod vision;
