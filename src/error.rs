//! Error types for the pdf2img library.
//!
//! Every pipeline stage returns [`Pdf2ImgError`] and lets it flow upward
//! untouched. The only place that turns an error into user-facing text is
//! [`crate::pipeline::classify`]; the public [`crate::convert`] entry point
//! never returns `Err`.
//!
//! All payloads are strings so the type is `Clone`: a failed engine
//! initialization is shared by every caller waiting on the same
//! single-flight future.

use thiserror::Error;

/// All errors raised inside the conversion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Pdf2ImgError {
    // ── Engine errors ─────────────────────────────────────────────────────
    /// The PDFium library could not be located, downloaded or bound.
    #[error(
        "Failed to load the PDF engine: {0}\n\n\
PDFium is normally downloaded automatically on first use.\n\
If the download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    EngineUnavailable(String),

    /// The loaded engine library belongs to a different release than the
    /// bindings were built for.
    #[error("The API version \"{api}\" does not match the Worker version \"{worker}\".")]
    VersionMismatch { api: String, worker: String },

    // ── Input errors ──────────────────────────────────────────────────────
    /// The input file could not be read.
    #[error("Failed to read '{name}': {reason}")]
    ReadFailed { name: String, reason: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes could not be parsed as a PDF document.
    #[error("Invalid PDF structure: {0}")]
    CorruptPdf(String),

    /// The requested page does not exist.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// PDFium failed while painting a page.
    #[error("Rendering page {page} failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (panicked blocking task, poisoned state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<pdfium_fetch::FetchError> for Pdf2ImgError {
    fn from(e: pdfium_fetch::FetchError) -> Self {
        Pdf2ImgError::EngineUnavailable(e.to_string())
    }
}

impl From<tokio::task::JoinError> for Pdf2ImgError {
    fn from(e: tokio::task::JoinError) -> Self {
        Pdf2ImgError::Internal(format!("Blocking task failed: {e}"))
    }
}
