//! Configuration types for PDF-to-PNG conversion.
//!
//! All per-conversion behaviour is controlled through [`ConversionConfig`],
//! built via its [`ConversionConfigBuilder`]. Where the engine library comes
//! from is a loader concern and lives in
//! [`crate::capability::EndpointConfig`] instead.

use crate::error::Pdf2ImgError;
use crate::pipeline::scale::ScaleLimits;
use crate::progress::ConversionObserver;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a conversion observer.
pub type Observer = Arc<dyn ConversionObserver>;

/// Configuration for a PDF-to-PNG conversion.
///
/// # Example
/// ```rust
/// use pdf2img::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .max_dimension(1024.0)
///     .max_scale(2.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.scale.max_scale, 2.0);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Bounds for the render multiplier. Default: longest edge 2048 px,
    /// scale clamped to `[1, 4]`.
    ///
    /// Small pages are upscaled for legibility, but never beyond
    /// `max_scale`; the surface is sized from the page, so this is what keeps
    /// a single conversion from allocating an unbounded pixel buffer.
    pub scale: ScaleLimits,

    /// Encode the surface with the in-process PNG encoder. Default: true.
    ///
    /// When false the exporter takes the data-URL route: base64 PNG text
    /// that is then decoded back into a blob.
    pub native_encoding: bool,

    /// Receives a callback for every pipeline stage. Default: none.
    pub observer: Option<Observer>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            scale: ScaleLimits::default(),
            native_encoding: true,
            observer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("scale", &self.scale)
            .field("native_encoding", &self.native_encoding)
            .field(
                "observer",
                &self.observer.as_ref().map(|_| "<dyn ConversionObserver>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn max_dimension(mut self, px: f32) -> Self {
        self.config.scale.max_dimension = px;
        self
    }

    pub fn min_scale(mut self, scale: f32) -> Self {
        self.config.scale.min_scale = scale;
        self
    }

    pub fn max_scale(mut self, scale: f32) -> Self {
        self.config.scale.max_scale = scale;
        self
    }

    pub fn native_encoding(mut self, v: bool) -> Self {
        self.config.native_encoding = v;
        self
    }

    pub fn observer(mut self, observer: Observer) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImgError> {
        let s = &self.config.scale;
        if !s.max_dimension.is_finite() || s.max_dimension <= 0.0 {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "max dimension must be a positive number, got {}",
                s.max_dimension
            )));
        }
        if !s.min_scale.is_finite() || s.min_scale < 1.0 {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "min scale must be ≥ 1, got {}",
                s.min_scale
            )));
        }
        if !s.max_scale.is_finite() || s.max_scale < s.min_scale {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "max scale must be ≥ min scale ({}), got {}",
                s.min_scale, s.max_scale
            )));
        }
        Ok(self.config)
    }
}
