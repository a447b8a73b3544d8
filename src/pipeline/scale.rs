//! Render-scale selection.
//!
//! The surface is sized from the page, so the scale is what bounds memory:
//! small pages are upscaled until their longest edge reaches
//! `max_dimension`, but never by more than `max_scale`, and pages already
//! larger than `max_dimension` are rendered at `min_scale`.

use serde::{Deserialize, Serialize};

/// Longest edge, in pixels, that upscaling aims for.
pub const MAX_DIMENSION: f32 = 2048.0;
/// Lower bound of the render multiplier.
pub const MIN_SCALE: f32 = 1.0;
/// Upper bound of the render multiplier.
pub const MAX_SCALE: f32 = 4.0;

/// Bounds used by [`ScaleLimits::scale_for`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub max_dimension: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl ScaleLimits {
    /// Finite bounds with `min_scale ≤ max_scale`.
    pub fn is_valid(&self) -> bool {
        self.min_scale.is_finite() && self.max_scale.is_finite() && self.min_scale <= self.max_scale
    }

    /// Multiplier for a page whose natural size is `base_width × base_height`.
    ///
    /// Always finite and within `[min_scale, max_scale]`; degenerate input
    /// (zero, negative overflow, NaN, infinite) yields `min_scale`.
    ///
    /// Limits that skipped builder validation (NaN, infinite or inverted
    /// bounds) never panic: they yield `min_scale` when it is a finite
    /// number ≥ 1, otherwise [`MIN_SCALE`].
    pub fn scale_for(&self, base_width: f32, base_height: f32) -> f32 {
        if !self.is_valid() {
            return if self.min_scale.is_finite() && self.min_scale >= MIN_SCALE {
                self.min_scale
            } else {
                MIN_SCALE
            };
        }
        if base_width.is_nan() || base_height.is_nan() {
            return self.min_scale;
        }
        let target_max = base_width.max(base_height);
        let ratio = self.max_dimension / target_max;
        if !ratio.is_finite() {
            return self.min_scale;
        }
        ratio.clamp(self.min_scale, self.max_scale)
    }
}

/// [`ScaleLimits::scale_for`] with the default limits (2048 px, `[1, 4]`).
pub fn compute_scale(base_width: f32, base_height: f32) -> f32 {
    ScaleLimits::default().scale_for(base_width, base_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_page_is_upscaled_towards_max_dimension() {
        // 612 × 792 pt → 2048 / 792
        let s = compute_scale(612.0, 792.0);
        assert!((s - 2048.0 / 792.0).abs() < 1e-5, "got {s}");
    }

    #[test]
    fn tiny_page_is_capped_at_max_scale() {
        assert_eq!(compute_scale(100.0, 50.0), 4.0);
    }

    #[test]
    fn page_at_max_dimension_is_not_scaled() {
        assert_eq!(compute_scale(2048.0, 1000.0), 1.0);
    }

    #[test]
    fn oversized_page_is_never_downscaled() {
        assert_eq!(compute_scale(5000.0, 14400.0), 1.0);
    }

    #[test]
    fn degenerate_dimensions_fall_back_to_one() {
        assert_eq!(compute_scale(0.0, 0.0), 1.0);
        assert_eq!(compute_scale(f32::NAN, 300.0), 1.0);
        assert_eq!(compute_scale(300.0, f32::NAN), 1.0);
        assert_eq!(compute_scale(-10.0, -20.0), 1.0);
        assert_eq!(compute_scale(f32::INFINITY, 10.0), 1.0);
    }

    #[test]
    fn result_is_always_finite_and_bounded() {
        let samples = [0.001_f32, 0.5, 1.0, 72.0, 511.9, 512.0, 2047.0, 2049.0, 1e6, f32::MAX];
        for &w in &samples {
            for &h in &samples {
                let s = compute_scale(w, h);
                assert!(s.is_finite(), "{w}×{h} → {s}");
                assert!((1.0..=4.0).contains(&s), "{w}×{h} → {s}");
            }
        }
    }

    #[test]
    fn custom_limits_are_respected() {
        let limits = ScaleLimits {
            max_dimension: 1000.0,
            min_scale: 1.0,
            max_scale: 2.0,
        };
        assert_eq!(limits.scale_for(250.0, 100.0), 2.0);
        assert_eq!(limits.scale_for(800.0, 100.0), 1.25);
    }

    #[test]
    fn inverted_limits_do_not_panic() {
        let limits = ScaleLimits {
            max_dimension: 2048.0,
            min_scale: 4.0,
            max_scale: 1.0,
        };
        assert!(!limits.is_valid());
        assert_eq!(limits.scale_for(100.0, 100.0), 4.0);
    }

    #[test]
    fn nan_limits_fall_back_to_one() {
        let nan_max = ScaleLimits {
            max_scale: f32::NAN,
            ..Default::default()
        };
        assert_eq!(nan_max.scale_for(100.0, 100.0), 1.0);

        let nan_min = ScaleLimits {
            min_scale: f32::NAN,
            ..Default::default()
        };
        assert_eq!(nan_min.scale_for(100.0, 100.0), 1.0);

        let nan_dimension = ScaleLimits {
            max_dimension: f32::NAN,
            ..Default::default()
        };
        assert_eq!(nan_dimension.scale_for(100.0, 100.0), 1.0);
    }
}
