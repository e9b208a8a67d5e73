//! Parallel page fan-out and ordered recombination for the vision path.
//!
//! ## Ordering
//!
//! Page order is semantically meaningful — documents read top to bottom — so
//! the combined output must follow input page order, never completion order.
//! `futures::stream::iter(..).buffered(n)` yields results in the order the
//! futures were supplied while still running up to `n` of them concurrently,
//! which gives the ordering guarantee by construction.
//!
//! ## Failure policy
//!
//! There is no per-page retry and no partial output: the first failing page
//! aborts the whole batch and the request surfaces the error. Each page image
//! file is deleted exactly once, immediately after its extraction call
//! returns, whether it succeeded or not; the request's scratch directory
//! sweeps up anything left behind by an aborted batch.

use crate::clients::vision::VisionModel;
use crate::error::{GatewayError, Result};
use crate::pipeline::encode;
use crate::pipeline::render::PageImage;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Timing breakdown for one vision-path request, in seconds.
///
/// `total_time` includes overhead outside the two measured phases, so it is
/// not guaranteed to equal their sum.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct VisionTimings {
    /// Wall-clock time for the whole request.
    pub total_time: f64,
    /// Time spent in the parallel vision-model calls.
    pub vision_time: f64,
    /// Time spent saving the upload and rasterising it.
    pub extract_final: f64,
}

/// Run the extraction prompt over every page concurrently and join the
/// per-page outputs in ascending page order, separated by `"\n"`.
///
/// An empty `pages` slice is a valid input and yields an empty string.
pub async fn extract_pages(
    model: &Arc<dyn VisionModel>,
    pages: &[PageImage],
    prompt: &str,
    concurrency: usize,
) -> Result<String> {
    let concurrency = concurrency.max(1);
    debug!(
        "extracting {} pages with concurrency {}",
        pages.len(),
        concurrency
    );

    // Building the future list eagerly (rather than streaming a lazy
    // iterator adaptor) sidesteps a rustc limitation where the handler
    // future otherwise fails the `Send` auto-trait check (#102211).
    let futures: Vec<_> = pages
        .iter()
        .map(|page| {
            let model = Arc::clone(model);
            let page = page.clone();
            async move { extract_one(&model, &page, prompt).await }
        })
        .collect();

    let results: Vec<Result<String>> = stream::iter(futures)
        .buffered(concurrency)
        .collect()
        .await;

    let texts = results.into_iter().collect::<Result<Vec<String>>>()?;
    Ok(texts.join("\n"))
}

/// Extract one page, then delete its image file regardless of outcome.
async fn extract_one(
    model: &Arc<dyn VisionModel>,
    page: &PageImage,
    prompt: &str,
) -> Result<String> {
    let image = encode::encode_image_file(&page.path).await?;

    let outcome = model
        .extract(&image, prompt)
        .await
        .map_err(|e| GatewayError::Vision {
            page: page.index,
            detail: e.to_string(),
        });

    // Exactly one deletion per image, on the success and failure path alike.
    if let Err(e) = tokio::fs::remove_file(&page.path).await {
        warn!("failed to delete page image {}: {}", page.path.display(), e);
    }

    outcome
}
