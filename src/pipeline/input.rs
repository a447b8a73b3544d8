//! Input: a named PDF, either already in memory or on disk.

use crate::error::Pdf2ImgError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a [`PdfFile`]'s bytes live.
#[derive(Debug, Clone)]
pub enum PdfSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A user-provided PDF and its display name.
#[derive(Debug, Clone)]
pub struct PdfFile {
    name: String,
    source: PdfSource,
}

impl PdfFile {
    /// A file whose bytes are already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: PdfSource::Bytes(bytes.into()),
        }
    }

    /// A file on disk, named after its final path component.
    ///
    /// Nothing is read until [`PdfFile::read_bytes`] is called.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            source: PdfSource::Path(path),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &PdfSource {
        &self.source
    }

    /// The on-disk location, when the file came from one.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            PdfSource::Path(p) => Some(p),
            PdfSource::Bytes(_) => None,
        }
    }

    /// The file's full contents.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, Pdf2ImgError> {
        match &self.source {
            PdfSource::Bytes(bytes) => Ok(bytes.clone()),
            PdfSource::Path(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| Pdf2ImgError::ReadFailed {
                        name: self.name.clone(),
                        reason: e.to_string(),
                    })?;
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
        }
    }
}
