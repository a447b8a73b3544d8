//! Page rasterisation: paint page 1 of an opened document onto a surface.
//!
//! Everything here is blocking and runs on the thread that owns the
//! [`RenderEngine`](crate::capability::RenderEngine) session.

use crate::capability::DocumentHandle;
use crate::error::Pdf2ImgError;
use crate::pipeline::scale::ScaleLimits;
use crate::progress::{ConversionObserver, Stage};
use crate::surface::{RasterSurface, SmoothingQuality};
use tracing::{debug, warn};

/// The only page ever rendered.
pub const FIRST_PAGE: usize = 1;

/// Render page 1 of `document` at the scale `limits` choose for it.
///
/// A page whose viewport floors to zero pixels yields an empty surface
/// without being painted; encoding rejects it later.
pub fn render_first_page(
    document: &dyn DocumentHandle,
    limits: &ScaleLimits,
    observer: &dyn ConversionObserver,
) -> Result<RasterSurface, Pdf2ImgError> {
    let total = document.page_count();
    if total > FIRST_PAGE {
        debug!("Document has {} pages; rendering page 1 only", total);
    }

    observer.on_stage(Stage::FetchingPage);
    let page = document.page(FIRST_PAGE)?;

    observer.on_stage(Stage::ComputingViewport);
    let base = page.viewport(1.0);
    let scale = limits.scale_for(base.width, base.height);
    let viewport = page.viewport(scale);
    debug!(
        "Page {}: {:.1}x{:.1} pt → scale {:.3} → {:.1}x{:.1} px",
        page.number(),
        base.width,
        base.height,
        scale,
        viewport.width,
        viewport.height
    );

    let mut surface = RasterSurface::for_viewport(&viewport);
    surface.set_image_smoothing(true);
    surface.set_smoothing_quality(SmoothingQuality::High);

    observer.on_stage(Stage::Rendering);
    if surface.width() == 0 || surface.height() == 0 {
        warn!(
            "Page {} has an empty viewport ({}x{} px); nothing to paint",
            page.number(),
            surface.width(),
            surface.height()
        );
        return Ok(surface);
    }
    page.render(&mut surface, &viewport)?;
    Ok(surface)
}
