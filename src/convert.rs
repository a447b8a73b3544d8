//! Conversion entry points.
//!
//! [`Converter::convert`] is the single boundary where failures are shaped:
//! every path through the pipeline ends in a [`ConversionResult`], and the
//! only errors users see are the ones [`classify`] produced.

use crate::capability::CapabilityLoader;
use crate::config::{ConversionConfig, Observer};
use crate::error::Pdf2ImgError;
use crate::object_url::ObjectUrlStore;
use crate::output::{BinaryArtifact, ConversionResult};
use crate::pipeline::classify::classify;
use crate::pipeline::input::PdfFile;
use crate::pipeline::{assemble, encode, render};
use crate::progress::{NoopObserver, Stage};
use crate::surface::RasterSurface;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Converts the first page of PDFs to PNG.
///
/// Cheap to clone; clones share the loader and object-URL store.
#[derive(Clone)]
pub struct Converter {
    loader: Arc<CapabilityLoader>,
    urls: Arc<ObjectUrlStore>,
    config: ConversionConfig,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionConfig::default())
    }
}

impl Converter {
    /// A converter backed by the process-wide PDFium loader and URL store.
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            loader: CapabilityLoader::global(),
            urls: ObjectUrlStore::global(),
            config,
        }
    }

    /// A converter using `loader`, with a private URL store.
    pub fn with_loader(loader: Arc<CapabilityLoader>, config: ConversionConfig) -> Self {
        Self {
            loader,
            urls: Arc::new(ObjectUrlStore::new()),
            config,
        }
    }

    /// Register results in `urls` instead.
    pub fn with_url_store(mut self, urls: Arc<ObjectUrlStore>) -> Self {
        self.urls = urls;
        self
    }

    pub fn loader(&self) -> &Arc<CapabilityLoader> {
        &self.loader
    }

    pub fn urls(&self) -> &Arc<ObjectUrlStore> {
        &self.urls
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert page 1 of `file` to PNG.
    ///
    /// Never fails: errors are reported through [`ConversionResult::error`].
    /// On success the image stays registered under `image_url` in
    /// [`Converter::urls`] until revoked there.
    pub async fn convert(&self, file: &PdfFile) -> ConversionResult {
        let start = Instant::now();
        info!("Converting {}", file.name());
        let observer = self.observer();

        let result = match self.try_convert(file, &observer).await {
            Ok(artifact) => {
                observer.on_stage(Stage::Assembling);
                assemble::assemble(file.name(), artifact, &self.urls)
            }
            Err(e) => {
                warn!("Conversion of {} failed: {}", file.name(), e);
                ConversionResult::failure(classify(&e))
            }
        };

        match &result.error {
            None => info!(
                "Converted {} → {} in {}ms",
                file.name(),
                result.image_url,
                start.elapsed().as_millis()
            ),
            Some(error) => debug!("Conversion result error: {}", error),
        }
        observer.on_finished(&result);
        result
    }

    /// Load → read → open → page 1 → viewport → render → encode.
    ///
    /// `Ok(None)` means the surface could not be encoded.
    async fn try_convert(
        &self,
        file: &PdfFile,
        observer: &Observer,
    ) -> Result<Option<BinaryArtifact>, Pdf2ImgError> {
        observer.on_stage(Stage::LoadingEngine);
        let capability = self.loader.ensure_loaded().await?;

        observer.on_stage(Stage::ReadingFile);
        let bytes = file.read_bytes().await?;

        let limits = self.config.scale;
        let blocking_observer = Arc::clone(observer);
        let surface = tokio::task::spawn_blocking(move || -> Result<RasterSurface, Pdf2ImgError> {
            blocking_observer.on_stage(Stage::OpeningDocument);
            let engine = capability.engine()?;
            let document = engine.open_document(&bytes)?;
            let surface = render::render_first_page(&*document, &limits, &*blocking_observer)?;
            Ok(surface)
        })
        .await??;

        observer.on_stage(Stage::Encoding);
        Ok(encode::to_binary(surface, self.config.native_encoding).await)
    }

    fn observer(&self) -> Observer {
        self.config
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(NoopObserver))
    }
}

/// Convert page 1 of `file` with the default configuration.
///
/// The result's `image_url` is registered in the process-wide store and is
/// never freed automatically: call
/// `ObjectUrlStore::global().revoke(&result.image_url)` once the URL is no
/// longer needed.
pub async fn convert(file: PdfFile) -> ConversionResult {
    Converter::default().convert(&file).await
}

/// Convert page 1 of the PDF at `path`.
///
/// Like [`convert`], the URL lives in [`ObjectUrlStore::global`] until revoked.
pub async fn convert_path(path: impl AsRef<Path>, config: &ConversionConfig) -> ConversionResult {
    let file = PdfFile::from_path(path.as_ref());
    Converter::new(config.clone()).convert(&file).await
}

/// Synchronous wrapper around [`Converter::convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(file: PdfFile, config: &ConversionConfig) -> ConversionResult {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(Converter::new(config.clone()).convert(&file)),
        Err(e) => ConversionResult::failure(classify(&Pdf2ImgError::Internal(format!(
            "Failed to create tokio runtime: {e}"
        )))),
    }
}
