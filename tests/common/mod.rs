//! Shared fixtures: an in-process fake engine and a stage recorder.

#![allow(dead_code)]

use futures::future::{BoxFuture, FutureExt};
use image::{Rgba, RgbaImage};
use pdf2img::capability::{DocumentHandle, PageHandle, RenderCapability, RenderEngine};
use pdf2img::{
    CapabilityHandle, CapabilityLoader, ConversionObserver, ConversionResult, EndpointConfig,
    Pdf2ImgError, RasterSurface, Stage, Viewport, WorkerEndpoint,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const FAKE_API_VERSION: &str = "fake-1";
pub const INK: Rgba<u8> = Rgba([20, 40, 200, 255]);

/// Engine that accepts any bytes starting with `%PDF` as a document of
/// `pages` pages, each `page_size` points large.
pub struct FakeCapability {
    endpoint: WorkerEndpoint,
    pub pages: usize,
    pub page_size: (f32, f32),
    pub worker_version: String,
    pub sessions: AtomicUsize,
}

impl FakeCapability {
    pub fn new(page_size: (f32, f32)) -> Self {
        Self {
            endpoint: WorkerEndpoint::Local {
                library: PathBuf::from("./libfake.so"),
            },
            pages: 1,
            page_size,
            worker_version: FAKE_API_VERSION.to_string(),
            sessions: AtomicUsize::new(0),
        }
    }

    pub fn letter() -> Self {
        Self::new((612.0, 792.0))
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_worker_version(mut self, version: &str) -> Self {
        self.worker_version = version.to_string();
        self
    }
}

impl RenderCapability for FakeCapability {
    fn worker_endpoint(&self) -> &WorkerEndpoint {
        &self.endpoint
    }

    fn api_version(&self) -> &str {
        FAKE_API_VERSION
    }

    fn engine(&self) -> Result<Box<dyn RenderEngine + '_>, Pdf2ImgError> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeEngine { cap: self }))
    }
}

struct FakeEngine<'c> {
    cap: &'c FakeCapability,
}

impl RenderEngine for FakeEngine<'_> {
    fn open_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn DocumentHandle + 'a>, Pdf2ImgError> {
        if self.cap.worker_version != FAKE_API_VERSION {
            return Err(Pdf2ImgError::VersionMismatch {
                api: FAKE_API_VERSION.to_string(),
                worker: self.cap.worker_version.clone(),
            });
        }
        if !bytes.starts_with(b"%PDF") {
            return Err(Pdf2ImgError::CorruptPdf("missing %PDF header".into()));
        }
        Ok(Box::new(FakeDocument {
            pages: self.cap.pages,
            size: self.cap.page_size,
        }))
    }
}

struct FakeDocument {
    pages: usize,
    size: (f32, f32),
}

impl DocumentHandle for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn page<'a>(&'a self, number: usize) -> Result<Box<dyn PageHandle + 'a>, Pdf2ImgError> {
        if number == 0 || number > self.pages {
            return Err(Pdf2ImgError::PageOutOfRange {
                page: number,
                total: self.pages,
            });
        }
        Ok(Box::new(FakePage {
            number,
            size: self.size,
        }))
    }
}

struct FakePage {
    number: usize,
    size: (f32, f32),
}

impl PageHandle for FakePage {
    fn number(&self) -> usize {
        self.number
    }

    fn viewport(&self, scale: f32) -> Viewport {
        Viewport::new(self.size.0, self.size.1, scale)
    }

    fn render(&self, surface: &mut RasterSurface, viewport: &Viewport) -> Result<(), Pdf2ImgError> {
        let (w, h) = viewport.surface_size();
        surface.paint(&RgbaImage::from_pixel(w, h, INK));
        Ok(())
    }
}

/// Loader that hands out `capability` after `delay`, counting initializations.
pub fn fake_loader(
    capability: FakeCapability,
    delay: Duration,
) -> (Arc<CapabilityLoader>, Arc<AtomicUsize>) {
    let capability: CapabilityHandle = Arc::new(capability);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let loader = CapabilityLoader::new(
        EndpointConfig::default(),
        move |_endpoint: WorkerEndpoint| -> BoxFuture<'static, Result<CapabilityHandle, Pdf2ImgError>> {
            counter.fetch_add(1, Ordering::SeqCst);
            let capability = Arc::clone(&capability);
            async move {
                tokio::time::sleep(delay).await;
                Ok(capability)
            }
            .boxed()
        },
    );
    (Arc::new(loader), calls)
}

/// Loader whose first initialization fails.
pub fn flaky_loader(capability: FakeCapability) -> (Arc<CapabilityLoader>, Arc<AtomicUsize>) {
    let capability: CapabilityHandle = Arc::new(capability);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let loader = CapabilityLoader::new(
        EndpointConfig::default(),
        move |_endpoint: WorkerEndpoint| -> BoxFuture<'static, Result<CapabilityHandle, Pdf2ImgError>> {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            let capability = Arc::clone(&capability);
            async move {
                if attempt == 0 {
                    Err(Pdf2ImgError::EngineUnavailable("download interrupted".into()))
                } else {
                    Ok(capability)
                }
            }
            .boxed()
        },
    );
    (Arc::new(loader), calls)
}

/// Bytes the fake engine accepts as a PDF.
pub fn fake_pdf() -> Vec<u8> {
    b"%PDF-1.4\n% fake document\n%%EOF\n".to_vec()
}

/// Records every stage and the finished result.
#[derive(Default)]
pub struct Recorder {
    pub stages: Mutex<Vec<Stage>>,
    pub finished: Mutex<Vec<ConversionResult>>,
}

impl Recorder {
    pub fn stages(&self) -> Vec<Stage> {
        self.stages.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<ConversionResult> {
        self.finished.lock().unwrap().clone()
    }
}

impl ConversionObserver for Recorder {
    fn on_stage(&self, stage: Stage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_finished(&self, result: &ConversionResult) {
        self.finished.lock().unwrap().push(result.clone());
    }
}
