//! # pdf2img
//!
//! Convert the first page of a PDF into a PNG image.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Engine  load PDFium once per process (single-flight, version-pinned)
//!  ├─ 2. Read    the file's bytes
//!  ├─ 3. Open    parse the document (spawn_blocking)
//!  ├─ 4. Scale   longest edge towards 2048 px, multiplier clamped to [1, 4]
//!  ├─ 5. Render  page 1 onto an RGBA surface, high-quality smoothing
//!  ├─ 6. Encode  PNG (native encoder, or data-URL fallback)
//!  └─ 7. Output  `name.png`, a `blob:` URL, or a classified error message
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert, PdfFile};
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = convert(PdfFile::from_path("report.pdf")).await;
//!     match (&result.file, &result.error) {
//!         (Some(file), _) => println!("{} ({} bytes) at {}", file.name, file.size(), result.image_url),
//!         (None, Some(error)) => eprintln!("{error}"),
//!         (None, None) => unreachable!(),
//!     }
//! }
//! ```
//!
//! The PDFium library is downloaded on first use and cached; set
//! `PDFIUM_LIB_PATH` to use an existing copy instead.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2img = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capability;
pub mod config;
pub mod convert;
pub mod error;
pub mod object_url;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod surface;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capability::{
    CapabilityHandle, CapabilityInitializer, CapabilityLoader, EndpointConfig, PdfiumInitializer,
    WorkerEndpoint,
};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_path, convert_sync, Converter};
pub use error::Pdf2ImgError;
pub use object_url::ObjectUrlStore;
pub use output::{BinaryArtifact, ConversionResult, ImageFile};
pub use pipeline::input::PdfFile;
pub use pipeline::scale::{compute_scale, ScaleLimits};
pub use progress::{ConversionObserver, NoopObserver, Stage};
pub use surface::{RasterSurface, SmoothingQuality, Viewport};
