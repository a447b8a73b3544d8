//! The rendering capability and how it is loaded.
//!
//! The pipeline never talks to PDFium directly. It sees four small traits:
//!
//! ```text
//! RenderCapability ──engine()──▶ RenderEngine ──open_document()──▶ DocumentHandle
//!   (shared, Send+Sync)           (one blocking session)            │
//!                                                                   └─page(n)──▶ PageHandle
//!                                                                        viewport(), render()
//! ```
//!
//! A [`RenderCapability`] is loaded once per process by the
//! [`CapabilityLoader`] and shared behind an `Arc`. PDFium itself is
//! thread-confined, so each conversion opens its own [`RenderEngine`] session
//! inside `spawn_blocking`; everything it hands out borrows from that session
//! and is dropped before the blocking task returns.

pub mod endpoint;
pub mod loader;
pub mod pdfium;

pub use endpoint::{EndpointConfig, WorkerEndpoint};
pub use loader::{CapabilityInitializer, CapabilityLoader};
pub use pdfium::{PdfiumCapability, PdfiumInitializer};

use crate::error::Pdf2ImgError;
use crate::surface::{RasterSurface, Viewport};
use std::sync::Arc;

/// Shared handle to the loaded capability.
pub type CapabilityHandle = Arc<dyn RenderCapability>;

/// A loaded PDF-rendering component.
pub trait RenderCapability: Send + Sync {
    /// Where the engine library was resolved from.
    fn worker_endpoint(&self) -> &WorkerEndpoint;

    /// Release the bindings were built for.
    fn api_version(&self) -> &str;

    /// Start a rendering session on the current thread.
    ///
    /// Blocking; sessions may be serialized by the implementation.
    fn engine(&self) -> Result<Box<dyn RenderEngine + '_>, Pdf2ImgError>;
}

/// A thread-confined rendering session.
pub trait RenderEngine {
    /// Parse `bytes` as a PDF document.
    fn open_document<'a>(&'a self, bytes: &'a [u8])
        -> Result<Box<dyn DocumentHandle + 'a>, Pdf2ImgError>;
}

/// An opened document.
pub trait DocumentHandle {
    fn page_count(&self) -> usize;

    /// Page by 1-based number.
    fn page<'a>(&'a self, number: usize) -> Result<Box<dyn PageHandle + 'a>, Pdf2ImgError>;
}

/// One page of an opened document.
pub trait PageHandle {
    /// 1-based page number.
    fn number(&self) -> usize;

    /// The page's geometry at `scale`; `scale == 1.0` gives the natural size
    /// in PDF points.
    fn viewport(&self, scale: f32) -> Viewport;

    /// Paint the page onto `surface` at `viewport`, honouring the surface's
    /// smoothing settings.
    fn render(&self, surface: &mut RasterSurface, viewport: &Viewport) -> Result<(), Pdf2ImgError>;
}
