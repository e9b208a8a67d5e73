//! Upload intake: pull the PDF out of the multipart body and spool it to a
//! request-scoped scratch directory.
//!
//! ## Why a per-request `TempDir`?
//!
//! pdfium and the hosted SDK endpoints need a file-system path, so the upload
//! has to touch disk. A fresh [`TempDir`] per request gives each upload an
//! isolated location — two concurrent requests can never clobber each other's
//! in-flight artifacts — and the directory is removed on drop, on every exit
//! path including errors and panics.
//!
//! All three endpoints share this intake step, so the `.pdf` extension check
//! applies uniformly.

use crate::error::{GatewayError, Result};
use axum::body::Bytes;
use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// An uploaded document held in memory for the duration of one request.
pub struct UploadedDocument {
    /// Original client-supplied filename.
    pub filename: String,
    /// Raw PDF bytes.
    pub bytes: Bytes,
}

/// The uploaded PDF spooled to disk, plus the scratch directory that owns it.
///
/// Keep this value alive for as long as any downstream step reads from the
/// scratch directory; dropping it deletes everything under it.
pub struct ScratchFile {
    dir: TempDir,
    pdf_path: PathBuf,
}

impl ScratchFile {
    /// Path to the spooled PDF.
    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    /// The scratch directory, usable for further per-request artifacts
    /// (rasterised page images).
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Read the uploaded PDF from the multipart body.
///
/// Expects a single field named `file` carrying a filename with a `.pdf`
/// extension (case-insensitive). Any other shape is an [`GatewayError::InvalidInput`].
pub async fn receive_pdf(multipart: &mut Multipart) -> Result<UploadedDocument> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::invalid_input(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| GatewayError::invalid_input("Upload is missing a filename."))?
            .to_string();

        if !has_pdf_extension(&filename) {
            return Err(GatewayError::invalid_input("Only PDF files are allowed."));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| GatewayError::invalid_input(format!("Failed to read upload: {e}")))?;

        debug!("received upload '{}' ({} bytes)", filename, bytes.len());
        return Ok(UploadedDocument { filename, bytes });
    }

    Err(GatewayError::invalid_input(
        "Multipart body has no 'file' field.",
    ))
}

/// Write the uploaded bytes into a fresh scratch directory.
///
/// The file is fully written and closed before this function returns, so
/// downstream readers always see complete bytes.
pub async fn spool(doc: &UploadedDocument) -> Result<ScratchFile> {
    let dir = tempfile::tempdir()?;
    // The client-supplied name is untrusted; keep only its final component.
    let safe_name = Path::new(&doc.filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    let pdf_path = dir.path().join(safe_name);

    tokio::fs::write(&pdf_path, &doc.bytes).await?;
    debug!("spooled upload to {}", pdf_path.display());

    Ok(ScratchFile { dir, pdf_path })
}

/// Case-insensitive `.pdf` extension check.
fn has_pdf_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
