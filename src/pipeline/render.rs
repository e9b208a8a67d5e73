//! PDF rasterisation: render every page to a PNG in the request's scratch
//! directory via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread pool
//! so one request's CPU-heavy rendering never stalls the Tokio workers that
//! are serving other requests.
//!
//! Images are written to the request-scoped scratch directory rather than a
//! shared folder, so concurrent requests cannot race on each other's pages.

use crate::error::GatewayError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One rasterised page, written to disk as a PNG.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page index.
    pub index: usize,
    /// Location of the encoded image in the request's scratch directory.
    pub path: PathBuf,
}

/// Rasterise all pages of `pdf_path` into `out_dir` at the given DPI.
///
/// Returns the produced images ordered by ascending page index. A zero-page
/// PDF yields an empty vec, which downstream treats as a valid empty result.
pub async fn render_pages(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PageImage>, GatewayError> {
    let pdf_path = pdf_path.to_path_buf();
    let out_dir = out_dir.to_path_buf();

    tokio::task::spawn_blocking(move || render_pages_blocking(&pdf_path, &out_dir, dpi))
        .await
        .map_err(|e| GatewayError::Internal(format!("Render task panicked: {e}")))?
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PageImage>, GatewayError> {
    let pdfium = Pdfium::default();

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| GatewayError::CorruptPdf {
            detail: format!("{e:?}"),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut results = Vec::with_capacity(total_pages);

    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| GatewayError::Rasterisation {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        // Points are 1/72 inch, so width_pt * dpi / 72 gives the pixel width
        // for the requested resolution.
        let target_width = (page.width().value * dpi as f32 / 72.0).round() as i32;
        let render_config = PdfRenderConfig::new().set_target_width(target_width.max(1));

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| GatewayError::Rasterisation {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })?;

        let image = bitmap.as_image();
        let path = out_dir.join(format!("page_{}.png", idx + 1));
        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| GatewayError::Rasterisation {
                page: idx + 1,
                detail: format!("PNG write failed: {e}"),
            })?;

        debug!(
            "rendered page {} → {}x{} px at {}",
            idx + 1,
            image.width(),
            image.height(),
            path.display()
        );

        results.push(PageImage {
            index: idx + 1,
            path,
        });
    }

    Ok(results)
}
