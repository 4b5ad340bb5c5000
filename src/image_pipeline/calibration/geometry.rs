//! Viewing geometry types

use crate::image_pipeline::calibration::calc_pixels_per_degree;
use crate::image_pipeline::common::error::Result;

/// Physical description of the display a stimulus is viewed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    /// Display resolution in pixels, `(width, height)`
    pub resolution: (u32, u32),
    /// Physical size of the visible area, `(width, height)`, in any unit
    pub display_size: (f64, f64),
    /// Eye-to-screen distance, same unit as `display_size`
    pub viewing_distance: f64,
}

impl Default for DisplayGeometry {
    /// 1024x768 panel, 36x27 cm, viewed from 61 cm.
    fn default() -> Self {
        Self {
            resolution: (1024, 768),
            display_size: (36.0, 27.0),
            viewing_distance: 61.0,
        }
    }
}

impl DisplayGeometry {
    pub fn new(resolution: (u32, u32), display_size: (f64, f64), viewing_distance: f64) -> Self {
        Self {
            resolution,
            display_size,
            viewing_distance,
        }
    }

    pub fn pixels_per_degree(&self) -> Result<f64> {
        calc_pixels_per_degree(self.resolution, self.display_size, self.viewing_distance)
    }
}
