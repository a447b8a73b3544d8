//! Output types returned by every conversion.

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Encoded PNG bytes. Clones share the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryArtifact(Arc<[u8]>);

impl BinaryArtifact {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for BinaryArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryArtifact({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for BinaryArtifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// A named PNG file wrapping a [`BinaryArtifact`].
///
/// Serializes as `{name, mime_type, size}`; the bytes are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    #[serde(rename = "size", serialize_with = "serialize_size")]
    pub artifact: BinaryArtifact,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, artifact: BinaryArtifact) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            artifact,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        self.artifact.bytes()
    }

    pub fn size(&self) -> usize {
        self.artifact.len()
    }
}

fn serialize_size<S: Serializer>(artifact: &BinaryArtifact, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(artifact.len() as u64)
}

/// Outcome of one conversion.
///
/// Exactly one side is populated: on success `image_url` and `file`, on
/// failure `error` (with `image_url` empty and `file` absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub image_url: String,
    pub file: Option<ImageFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn success(image_url: impl Into<String>, file: ImageFile) -> Self {
        Self {
            image_url: image_url.into(),
            file: Some(file),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            image_url: String::new(),
            file: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
