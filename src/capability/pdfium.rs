//! PDFium-backed implementation of the capability traits.
//!
//! PDFium keeps thread-local state and is not safe to drive from async
//! contexts, so a [`PdfiumCapability`] holds only the resolved library path.
//! Every [`RenderCapability::engine`] call binds the library afresh on the
//! calling (blocking) thread and holds a process-wide lock until the session
//! is dropped, so sessions are serialized across every capability instance
//! in the process, not just within one.

use super::endpoint::WorkerEndpoint;
use super::loader::CapabilityInitializer;
use super::{CapabilityHandle, DocumentHandle, PageHandle, RenderCapability, RenderEngine};
use crate::error::Pdf2ImgError;
use crate::surface::{RasterSurface, SmoothingQuality, Viewport};
use futures::future::{BoxFuture, FutureExt};
use once_cell::sync::Lazy;
use pdfium_fetch::ProgressFn;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Serializes PDFium sessions process-wide: library init/destroy must not
/// overlap another thread's open document.
static SESSION_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Guard for the process-wide PDFium session lock.
fn lock_session() -> MutexGuard<'static, ()> {
    SESSION_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Download progress callback: `(bytes_so_far, total_if_known)`.
pub type DownloadProgress = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Loads a [`PdfiumCapability`] for the endpoint the loader picked.
#[derive(Clone, Default)]
pub struct PdfiumInitializer {
    progress: Option<DownloadProgress>,
}

impl PdfiumInitializer {
    /// Report library download progress to `progress`.
    pub fn with_progress(progress: DownloadProgress) -> Self {
        Self {
            progress: Some(progress),
        }
    }
}

impl CapabilityInitializer for PdfiumInitializer {
    fn initialize(
        &self,
        endpoint: WorkerEndpoint,
    ) -> BoxFuture<'static, Result<CapabilityHandle, Pdf2ImgError>> {
        let progress = self.progress.clone();
        async move {
            let capability = tokio::task::spawn_blocking(move || {
                PdfiumCapability::load(endpoint, progress.as_deref())
            })
            .await??;
            Ok(Arc::new(capability) as CapabilityHandle)
        }
        .boxed()
    }
}

/// A resolved, bindable PDFium library.
#[derive(Debug)]
pub struct PdfiumCapability {
    endpoint: WorkerEndpoint,
    library: PathBuf,
    api_version: String,
    worker_version: Option<String>,
}

impl PdfiumCapability {
    /// Resolve the library for `endpoint` (downloading it if needed) and check
    /// that it binds.
    ///
    /// Blocking: call it from `spawn_blocking` in async code.
    pub fn load(
        endpoint: WorkerEndpoint,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<Self, Pdf2ImgError> {
        let library = match &endpoint {
            WorkerEndpoint::Remote { url, version } => {
                pdfium_fetch::fetch_library(url.as_str(), version, progress)?
            }
            WorkerEndpoint::Local { library } => {
                pdfium_fetch::env_library_override().unwrap_or_else(|| library.clone())
            }
        };
        let worker_version = pdfium_fetch::read_version_marker(&library);

        // Bind once up front so a missing or broken library fails the load, not the
        // first conversion.
        {
            let _guard = lock_session();
            drop(pdfium_fetch::bind(&library)?);
        }

        info!(
            "PDFium bound from {} (worker version {})",
            library.display(),
            worker_version.as_deref().unwrap_or("unknown")
        );

        Ok(Self {
            endpoint,
            library,
            api_version: pdfium_fetch::PDFIUM_VERSION.to_string(),
            worker_version,
        })
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    /// Release recorded next to the library, when known.
    pub fn worker_version(&self) -> Option<&str> {
        self.worker_version.as_deref()
    }
}

impl RenderCapability for PdfiumCapability {
    fn worker_endpoint(&self) -> &WorkerEndpoint {
        &self.endpoint
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }

    fn engine(&self) -> Result<Box<dyn RenderEngine + '_>, Pdf2ImgError> {
        let guard = lock_session();
        let pdfium = pdfium_fetch::bind(&self.library)?;
        Ok(Box::new(PdfiumEngine {
            pdfium,
            api_version: &self.api_version,
            worker_version: self.worker_version.as_deref(),
            _guard: guard,
        }))
    }
}

struct PdfiumEngine<'c> {
    pdfium: Pdfium,
    api_version: &'c str,
    worker_version: Option<&'c str>,
    _guard: MutexGuard<'static, ()>,
}

impl RenderEngine for PdfiumEngine<'_> {
    fn open_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn DocumentHandle + 'a>, Pdf2ImgError> {
        if let Some(worker) = self.worker_version {
            if worker != self.api_version {
                return Err(Pdf2ImgError::VersionMismatch {
                    api: self.api_version.to_string(),
                    worker: worker.to_string(),
                });
            }
        }

        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| Pdf2ImgError::CorruptPdf(format!("{:?}", e)))?;
        debug!("PDF loaded: {} pages", document.pages().len());
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl DocumentHandle for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page<'b>(&'b self, number: usize) -> Result<Box<dyn PageHandle + 'b>, Pdf2ImgError> {
        let total = self.page_count();
        if number == 0 || number > total {
            return Err(Pdf2ImgError::PageOutOfRange {
                page: number,
                total,
            });
        }

        let page = self
            .document
            .pages()
            .get((number - 1) as u16)
            .map_err(|e| Pdf2ImgError::RenderFailed {
                page: number,
                detail: format!("{:?}", e),
            })?;
        Ok(Box::new(PdfiumPage { page, number }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
    number: usize,
}

impl PageHandle for PdfiumPage<'_> {
    fn number(&self) -> usize {
        self.number
    }

    fn viewport(&self, scale: f32) -> Viewport {
        Viewport::new(self.page.width().value, self.page.height().value, scale)
    }

    fn render(&self, surface: &mut RasterSurface, viewport: &Viewport) -> Result<(), Pdf2ImgError> {
        let (width, height) = viewport.surface_size();
        let smooth =
            surface.image_smoothing_enabled() && surface.smoothing_quality() != SmoothingQuality::Low;

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .set_text_smoothing(smooth)
            .set_image_smoothing(smooth)
            .set_path_smoothing(smooth);

        let bitmap = self
            .page
            .render_with_config(&render_config)
            .map_err(|e| Pdf2ImgError::RenderFailed {
                page: self.number,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image().to_rgba8();
        debug!(
            "Rendered page {} → {}x{} px",
            self.number,
            image.width(),
            image.height()
        );
        surface.paint(&image);
        Ok(())
    }
}
