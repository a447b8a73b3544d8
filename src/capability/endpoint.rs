//! Worker endpoint selection: where the PDFium library comes from.
//!
//! The preferred endpoint is a release archive URL pinned to the same PDFium
//! release the bindings were built for. If that URL cannot be built (template
//! without a version slot, unsupported platform, malformed or non-HTTP URL),
//! the loader falls back to a fixed local directory and only logs a warning.

use pdfium_fetch::FetchError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// Release archive URL template. `{version}` and `{archive}` are substituted.
pub const DEFAULT_RELEASE_URL: &str =
    "https://github.com/bblanchon/pdfium-binaries/releases/download/chromium%2F{version}/{archive}";

/// Directory searched for the platform library when the remote endpoint is
/// unusable.
pub const DEFAULT_LOCAL_DIR: &str = "./";

/// The resolved engine source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEndpoint {
    /// Version-pinned release archive.
    Remote { url: Url, version: String },
    /// Platform library at a fixed local path.
    Local { library: PathBuf },
}

impl WorkerEndpoint {
    pub fn is_remote(&self) -> bool {
        matches!(self, WorkerEndpoint::Remote { .. })
    }
}

impl fmt::Display for WorkerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerEndpoint::Remote { url, version } => write!(f, "{url} (PDFium {version})"),
            WorkerEndpoint::Local { library } => write!(f, "{}", library.display()),
        }
    }
}

/// Why the remote endpoint could not be built.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("URL template '{0}' has no {{version}} placeholder")]
    Unpinned(String),

    #[error("release version is empty")]
    EmptyVersion,

    #[error(transparent)]
    Platform(#[from] FetchError),

    #[error("invalid engine URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("engine URL '{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Where to look for the engine library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Release URL template. Default: [`DEFAULT_RELEASE_URL`].
    pub url_template: String,
    /// Pinned PDFium release. Default: [`pdfium_fetch::PDFIUM_VERSION`].
    pub version: String,
    /// Fallback directory. Default: [`DEFAULT_LOCAL_DIR`].
    pub local_dir: PathBuf,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_RELEASE_URL.to_string(),
            version: pdfium_fetch::PDFIUM_VERSION.to_string(),
            local_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
        }
    }
}

impl EndpointConfig {
    /// Defaults overridden by `PDF2IMG_ENGINE_URL`, `PDF2IMG_ENGINE_VERSION`
    /// and `PDF2IMG_ENGINE_DIR` when they are set and non-empty.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(template) = var("PDF2IMG_ENGINE_URL") {
            config.url_template = template;
        }
        if let Some(version) = var("PDF2IMG_ENGINE_VERSION") {
            config.version = version;
        }
        if let Some(dir) = var("PDF2IMG_ENGINE_DIR") {
            config.local_dir = PathBuf::from(dir);
        }
        config
    }

    /// The pinned release endpoint for the current platform.
    pub fn remote_endpoint(&self) -> Result<WorkerEndpoint, EndpointError> {
        let platform = pdfium_fetch::current_platform()?;
        self.remote_endpoint_for(platform.archive_name)
    }

    /// The pinned release endpoint for an explicit archive name.
    pub fn remote_endpoint_for(&self, archive: &str) -> Result<WorkerEndpoint, EndpointError> {
        if !self.url_template.contains("{version}") {
            return Err(EndpointError::Unpinned(self.url_template.clone()));
        }
        let version = self.version.trim();
        if version.is_empty() {
            return Err(EndpointError::EmptyVersion);
        }

        let raw = self
            .url_template
            .replace("{version}", version)
            .replace("{archive}", archive);
        let url = Url::parse(&raw).map_err(|e| EndpointError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(raw));
        }

        Ok(WorkerEndpoint::Remote {
            url,
            version: version.to_string(),
        })
    }

    /// The fixed local fallback.
    pub fn local_endpoint(&self) -> WorkerEndpoint {
        WorkerEndpoint::Local {
            library: pdfium_fetch::local_library(&self.local_dir),
        }
    }

    /// Prefer the remote endpoint; fall back to the local one with a warning.
    pub fn select(&self) -> WorkerEndpoint {
        match self.remote_endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                let fallback = self.local_endpoint();
                warn!(
                    "pdf2img: failed to set remote engine endpoint ({}), falling back to {}",
                    e, fallback
                );
                fallback
            }
        }
    }
}
