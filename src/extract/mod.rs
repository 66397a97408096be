//! Plain-text extraction from uploaded documents
//!
//! Supported uploads are PDF, DOCX and PPTX documents plus a few image
//! formats, which yield a fixed placeholder. Extraction is best-effort:
//! layout is dropped and text is joined with newlines.

mod pptx;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Text recorded for image uploads
pub const IMAGE_PLACEHOLDER: &str = "[Image uploaded, text analysis not available]";

/// Errors raised while extracting text
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Upload could not be read back from disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("PPTX extraction failed: {0}")]
    Pptx(String),

    /// The blocking extraction task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Upload formats with a known extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    Image,
}

impl DocumentKind {
    /// Match a file extension, ignoring case and a leading dot
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "pptx" => Some(DocumentKind::Pptx),
            "jpg" | "jpeg" | "png" => Some(DocumentKind::Image),
            _ => None,
        }
    }

    /// Match the extension of a file name or path
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Lower-cased extension of a file name including the dot, or "" if none
pub fn extension_of(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Extract text from a file on disk (blocking)
pub fn extract_text(path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
    if kind == DocumentKind::Image {
        return Ok(IMAGE_PLACEHOLDER.to_string());
    }

    let bytes = std::fs::read(path)?;
    let text = extract_bytes(&bytes, kind)?;
    debug!(path = %path.display(), ?kind, chars = text.len(), "extracted document text");
    Ok(text)
}

/// Extract text from an in-memory document (blocking)
pub fn extract_bytes(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(bytes),
        DocumentKind::Docx => extract_docx(bytes),
        DocumentKind::Pptx => pptx::extract_pptx(bytes),
        DocumentKind::Image => Ok(IMAGE_PLACEHOLDER.to_string()),
    }
}

/// Run `extract_text` on the blocking thread pool
pub async fn extract_file(path: PathBuf, kind: DocumentKind) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&path, kind))
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(p) => Some(p.raw_text()),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}
