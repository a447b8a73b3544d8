//! Viewport and raster surface: the geometry a page is painted with, and the
//! pixel buffer it is painted onto.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageResult, RgbaImage};
use serde::{Deserialize, Serialize};

/// MIME type of every artifact this crate produces.
pub const PNG_MIME: &str = "image/png";

/// Rectangle and multiplier used to paint a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Viewport {
    /// Viewport for a page of natural size `width × height` (PDF points) at `scale`.
    pub fn new(natural_width: f32, natural_height: f32, scale: f32) -> Self {
        Self {
            width: natural_width * scale,
            height: natural_height * scale,
            scale,
        }
    }

    /// Integer pixel size of a surface for this viewport (dimensions floored).
    ///
    /// Negative and NaN dimensions saturate to zero.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.width.floor() as u32, self.height.floor() as u32)
    }
}

/// Requested resampling quality when smoothing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmoothingQuality {
    #[default]
    Low,
    Medium,
    High,
}

/// In-memory RGBA drawing target owned by a single conversion.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    smoothing_enabled: bool,
    smoothing_quality: SmoothingQuality,
}

impl RasterSurface {
    /// Allocate a transparent surface of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            smoothing_enabled: false,
            smoothing_quality: SmoothingQuality::default(),
        }
    }

    /// Allocate a surface sized for `viewport`.
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let (w, h) = viewport.surface_size();
        Self::new(w, h)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn set_image_smoothing(&mut self, enabled: bool) {
        self.smoothing_enabled = enabled;
    }

    pub fn image_smoothing_enabled(&self) -> bool {
        self.smoothing_enabled
    }

    pub fn set_smoothing_quality(&mut self, quality: SmoothingQuality) {
        self.smoothing_quality = quality;
    }

    pub fn smoothing_quality(&self) -> SmoothingQuality {
        self.smoothing_quality
    }

    /// Copy `image` onto the surface at the origin, clipping anything that
    /// falls outside it.
    pub fn paint(&mut self, image: &RgbaImage) {
        image::imageops::replace(&mut self.pixels, image, 0, 0);
    }

    /// Encode the surface as PNG at maximum compression.
    pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
        self.write_png(CompressionType::Best, FilterType::Adaptive)
    }

    /// Encode the surface as a `data:image/png;base64,…` URL.
    pub fn to_data_url(&self) -> ImageResult<String> {
        let png = self.write_png(CompressionType::Default, FilterType::Adaptive)?;
        Ok(format!("data:{PNG_MIME};base64,{}", STANDARD.encode(png)))
    }

    fn write_png(&self, compression: CompressionType, filter: FilterType) -> ImageResult<Vec<u8>> {
        let mut buf = Vec::new();
        PngEncoder::new_with_quality(&mut buf, compression, filter).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn viewport_scales_natural_size() {
        let v = Viewport::new(612.0, 792.0, 2.5);
        assert_eq!(v.width, 1530.0);
        assert_eq!(v.height, 1980.0);
        assert_eq!(v.scale, 2.5);
    }

    #[test]
    fn surface_size_floors_fractional_pixels() {
        let v = Viewport::new(100.7, 50.2, 1.0);
        assert_eq!(v.surface_size(), (100, 50));
    }

    #[test]
    fn surface_size_saturates_degenerate_dimensions() {
        assert_eq!(Viewport::new(-3.0, f32::NAN, 1.0).surface_size(), (0, 0));
    }

    #[test]
    fn smoothing_settings_round_trip() {
        let mut s = RasterSurface::new(2, 2);
        assert!(!s.image_smoothing_enabled());
        s.set_image_smoothing(true);
        s.set_smoothing_quality(SmoothingQuality::High);
        assert!(s.image_smoothing_enabled());
        assert_eq!(s.smoothing_quality(), SmoothingQuality::High);
    }

    #[test]
    fn paint_clips_to_surface() {
        let mut s = RasterSurface::new(2, 2);
        let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        s.paint(&red);
        assert_eq!(s.width(), 2);
        assert_eq!(*s.pixels().get_pixel(1, 1), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn encode_png_has_signature() {
        let s = RasterSurface::new(3, 3);
        let png = s.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn data_url_is_base64_png() {
        let url = RasterSurface::new(1, 1).to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"), "got: {url}");
    }

    #[test]
    fn empty_surface_cannot_be_encoded() {
        assert!(RasterSurface::new(0, 0).encode_png().is_err());
    }
}
