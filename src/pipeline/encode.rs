//! Image encoding: PNG file → base64 payload for the vision API.
//!
//! Vision APIs accept images as base64 data-URIs embedded in the JSON request
//! body, so no external image hosting is needed. The rasteriser already wrote
//! PNG bytes to disk; this stage only reads and re-encodes them.

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

/// A base64-encoded page image ready to inline into an API request.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Base64 of the raw image bytes.
    pub data: String,
    /// MIME type of the underlying image.
    pub mime_type: &'static str,
}

impl EncodedImage {
    /// Render as a `data:` URL suitable for an `image_url` content part.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Read an encoded page image from disk and base64-wrap it.
pub async fn encode_image_file(path: &Path) -> Result<EncodedImage> {
    let bytes = tokio::fs::read(path).await?;
    let data = STANDARD.encode(&bytes);
    debug!("encoded {} → {} bytes base64", path.display(), data.len());

    Ok(EncodedImage {
        data,
        mime_type: "image/png",
    })
}
