//! Observer trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionObserver>`] via
//! [`crate::config::ConversionConfigBuilder::observer`] to be told which
//! pipeline stage a conversion has reached. The CLI uses it to drive its
//! spinner; tests use it to check stage ordering.
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{ConversionConfig, ConversionObserver, Stage};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<Stage>>);
//!
//! impl ConversionObserver for Recorder {
//!     fn on_stage(&self, stage: Stage) {
//!         self.0.lock().unwrap().push(stage);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .observer(Arc::new(Recorder::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a conversion, in the order the pipeline runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Waiting for the shared rendering engine.
    LoadingEngine,
    /// Reading the input bytes.
    ReadingFile,
    /// Parsing the document.
    OpeningDocument,
    /// Fetching the first page.
    FetchingPage,
    /// Measuring the page and choosing a scale.
    ComputingViewport,
    /// Painting the page onto the raster surface.
    Rendering,
    /// Serializing the surface to PNG.
    Encoding,
    /// Building the named file and object URL.
    Assembling,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::LoadingEngine => "loading engine",
            Stage::ReadingFile => "reading file",
            Stage::OpeningDocument => "opening document",
            Stage::FetchingPage => "fetching page 1",
            Stage::ComputingViewport => "computing viewport",
            Stage::Rendering => "rendering",
            Stage::Encoding => "encoding PNG",
            Stage::Assembling => "assembling result",
        };
        f.write_str(label)
    }
}

/// Called by the conversion pipeline as it moves between stages.
///
/// Implementations must be `Send + Sync`: PDFium stages are reported from a
/// blocking worker thread, and several conversions may share one observer.
/// All methods default to no-ops.
pub trait ConversionObserver: Send + Sync {
    /// Called when a stage begins.
    fn on_stage(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once with the final outcome, success or failure.
    fn on_finished(&self, result: &ConversionResult) {
        let _ = result;
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}
