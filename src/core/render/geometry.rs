//! Crop Geometry
//!
//! Centered aspect-ratio cropping applied identically to every image clip so
//! all segments share one canvas shape.

use crate::core::CropRect;

/// Frames within this ratio distance count as already cropped. Flooring the
/// crop dimensions to integers perturbs the ratio slightly, and without the
/// tolerance a second pass would shave another pixel row.
const RATIO_EPSILON: f64 = 1e-3;

/// Computes the centered crop window that brings a `width`x`height` frame to
/// `target_ratio` (width / height).
///
/// A frame wider than the target loses width; a taller frame loses height; a
/// frame already at the ratio passes through unchanged. Output dimensions are
/// floored to integers and the origin is the integer-centered offset.
pub fn crop_to_ratio(width: u32, height: u32, target_ratio: f64) -> CropRect {
    if width == 0 || height == 0 || target_ratio <= 0.0 {
        return CropRect::full(width, height);
    }

    let current_ratio = width as f64 / height as f64;

    if (current_ratio - target_ratio).abs() < RATIO_EPSILON {
        CropRect::full(width, height)
    } else if current_ratio > target_ratio {
        let new_width = (height as f64 * target_ratio) as u32;
        CropRect {
            x: (width - new_width) / 2,
            y: 0,
            width: new_width,
            height,
        }
    } else {
        let new_height = (width as f64 / target_ratio) as u32;
        CropRect {
            x: 0,
            y: (height - new_height) / 2,
            width,
            height: new_height,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
