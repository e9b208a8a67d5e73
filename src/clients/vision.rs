//! Vision-model client: one page image in, free-text extraction out.
//!
//! The trait exists so the fan-out logic in [`crate::pipeline::vision`] can be
//! exercised with a scripted model in tests; production uses [`OpenAiVision`]
//! against the chat-completions API. There is deliberately no retry here —
//! a transport or API failure for one page propagates and aborts the batch
//! (see `pipeline::vision` for where that policy lives).

use crate::error::{GatewayError, Result};
use crate::pipeline::encode::EncodedImage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const OPENAI_API_BASE: &str = "https://api.openai.com";

/// A vision-capable model that can describe the content of one page image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Run the extraction prompt against one page image and return the
    /// model's free-text response.
    async fn extract(&self, image: &EncodedImage, prompt: &str) -> Result<String>;
}

/// Chat-completions client for OpenAI-style vision models.
pub struct OpenAiVision {
    http: Client,
    api_key: String,
    model: String,
    max_tokens: usize,
    base_url: String,
}

impl OpenAiVision {
    pub fn new(http: Client, api_key: String, model: String, max_tokens: usize) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
            base_url: OPENAI_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    async fn extract(&self, image: &EncodedImage, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream {
                service: "openai",
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                service: "openai",
                detail: format!("HTTP {status}: {body}"),
            });
        }

        let completion: ChatResponse =
            response.json().await.map_err(|e| GatewayError::Upstream {
                service: "openai",
                detail: format!("Malformed completion response: {e}"),
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::Upstream {
                service: "openai",
                detail: "Completion response has no choices".into(),
            })?;

        debug!("vision completion: {} chars", content.len());
        Ok(content)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}
