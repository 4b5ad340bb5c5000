//! Pixels-per-degree calibration
//!
//! Maps display pixel density to degrees of visual angle so that filter
//! cutoffs can be expressed in cycles per degree.

mod geometry;


use tracing::debug;

use crate::image_pipeline::common::error::{BlurError, Result};

pub use geometry::DisplayGeometry;

/// Relative tolerance allowed between the horizontal and vertical
/// degrees-per-pixel before the geometry is rejected as non-square.
pub const SQUARE_PIXEL_TOLERANCE: f64 = 1e-6;

/// Visual angle, in degrees, subtended by one pixel of the given physical size.
fn degrees_per_pixel(pixel_size: f64, viewing_distance: f64) -> f64 {
    (2.0 * (pixel_size / (2.0 * viewing_distance)).atan()).to_degrees()
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(BlurError::DomainError(format!(
            "{name} must be positive, got {value}"
        )));
    }
    Ok(())
}

/// Computes pixels per degree of visual angle for a display.
///
/// Both axes must subtend the same angle per pixel; a geometry whose
/// resolution and physical aspect ratios disagree is rejected with
/// [`BlurError::ConfigurationError`].
pub fn calc_pixels_per_degree(
    resolution: (u32, u32),
    display_size: (f64, f64),
    viewing_distance: f64,
) -> Result<f64> {
    let (w_px, h_px) = resolution;
    if w_px == 0 || h_px == 0 {
        return Err(BlurError::DomainError(format!(
            "resolution must be non-zero, got {w_px}x{h_px}"
        )));
    }
    ensure_positive("display width", display_size.0)?;
    ensure_positive("display height", display_size.1)?;
    ensure_positive("viewing distance", viewing_distance)?;

    let horizontal = degrees_per_pixel(display_size.0 / f64::from(w_px), viewing_distance);
    let vertical = degrees_per_pixel(display_size.1 / f64::from(h_px), viewing_distance);

    let mismatch = (horizontal - vertical).abs();
    if mismatch > SQUARE_PIXEL_TOLERANCE * horizontal.max(vertical) {
        return Err(BlurError::ConfigurationError {
            horizontal,
            vertical,
            mismatch,
        });
    }

    let pixels_per_degree = 1.0 / horizontal;
    debug!(
        pixels_per_degree,
        degrees_per_pixel = horizontal,
        "Computed display calibration"
    );
    Ok(pixels_per_degree)
}
