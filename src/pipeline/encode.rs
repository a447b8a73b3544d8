//! Surface export: `RasterSurface` → PNG bytes.
//!
//! Two routes produce the same artifact. The native route encodes the
//! pixels directly. The fallback route goes through a `data:` URL and decodes
//! it back into bytes, for callers that disable native encoding. Either route
//! reports failure as `None`, never as an error: an unencodable surface
//! becomes the "Failed to create image blob" result further down the line.

use crate::output::BinaryArtifact;
use crate::surface::{RasterSurface, PNG_MIME};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

/// Encode `surface` as PNG, preferring the native encoder when `native`.
pub fn surface_to_png(surface: &RasterSurface, native: bool) -> Option<BinaryArtifact> {
    let bytes = if native {
        match surface.encode_png() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("PNG encoding failed: {}", e);
                return None;
            }
        }
    } else {
        let url = match surface.to_data_url() {
            Ok(url) => url,
            Err(e) => {
                warn!("Data URL export failed: {}", e);
                return None;
            }
        };
        decode_data_url(&url)?
    };

    debug!(
        "Encoded {}x{} surface → {} bytes PNG",
        surface.width(),
        surface.height(),
        bytes.len()
    );
    Some(BinaryArtifact::new(bytes))
}

/// Async wrapper that keeps PNG compression off the runtime's worker threads.
pub async fn to_binary(surface: RasterSurface, native: bool) -> Option<BinaryArtifact> {
    match tokio::task::spawn_blocking(move || surface_to_png(&surface, native)).await {
        Ok(artifact) => artifact,
        Err(e) => {
            warn!("Encode task failed: {}", e);
            None
        }
    }
}

/// Decode a base64 `data:image/png` URL into its bytes.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let Some(rest) = url.strip_prefix("data:") else {
        warn!("Not a data URL");
        return None;
    };
    let Some((meta, payload)) = rest.split_once(',') else {
        warn!("Data URL has no payload separator");
        return None;
    };
    let Some(mime) = meta.strip_suffix(";base64") else {
        warn!("Data URL is not base64-encoded");
        return None;
    };
    if mime != PNG_MIME {
        warn!("Data URL has MIME type '{}', expected {}", mime, PNG_MIME);
        return None;
    }

    match STANDARD.decode(payload) {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        Ok(_) => {
            warn!("Data URL payload is empty");
            None
        }
        Err(e) => {
            warn!("Data URL payload is not valid base64: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_surface() -> RasterSurface {
        let mut s = RasterSurface::new(8, 4);
        s.paint(&RgbaImage::from_pixel(8, 4, Rgba([255, 0, 0, 255])));
        s
    }

    #[test]
    fn both_routes_yield_decodable_png() {
        for native in [true, false] {
            let artifact = surface_to_png(&red_surface(), native).expect("encodes");
            let img = image::load_from_memory(artifact.bytes()).expect("valid png");
            assert_eq!((img.width(), img.height()), (8, 4), "native={native}");
        }
    }

    #[test]
    fn empty_surface_yields_none() {
        assert!(surface_to_png(&RasterSurface::new(0, 0), true).is_none());
        assert!(surface_to_png(&RasterSurface::new(0, 5), false).is_none());
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(decode_data_url("image/png;base64,AAAA").is_none());
        assert!(decode_data_url("data:image/png;base64").is_none());
        assert!(decode_data_url("data:image/png,AAAA").is_none());
        assert!(decode_data_url("data:image/jpeg;base64,AAAA").is_none());
        assert!(decode_data_url("data:image/png;base64,!!!").is_none());
        assert!(decode_data_url("data:image/png;base64,").is_none());
    }

    #[tokio::test]
    async fn to_binary_runs_off_thread() {
        let artifact = to_binary(red_surface(), true).await.unwrap();
        assert_eq!(&artifact.bytes()[..4], b"\x89PNG");
    }
}
