//! Foveated compositing of a progressive-blur stack.
//!
//! Pixels near the fixation point come from the sharpest level; each ring of
//! `ring_step` pixels further out comes from the next, blurrier level, and
//! everything beyond the last ring from the blurriest one.

use tracing::debug;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{BlurError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoveationConfig {
    /// Radius, in pixels, at which the outermost ring ends
    pub window_radius: usize,
    /// Width of each ring in pixels
    pub ring_step: usize,
}

impl Default for FoveationConfig {
    fn default() -> Self {
        Self {
            window_radius: 300,
            ring_step: 2,
        }
    }
}

impl FoveationConfig {
    /// Radius of the sharp disc around the fixation point.
    pub fn inner_radius(&self, levels: usize) -> usize {
        self.window_radius
            .saturating_sub(levels.saturating_mul(self.ring_step))
    }

    /// Index of the level drawn at distance `distance` from the fixation point.
    pub fn level_for_distance(&self, distance: f64, levels: usize) -> usize {
        let last = levels.saturating_sub(1);
        let inner = self.inner_radius(levels) as f64;
        let step = self.ring_step as f64;

        (0..last)
            .find(|&k| distance < inner + (k as f64 + 1.0) * step)
            .unwrap_or(last)
    }
}

/// Composites `levels` (sharpest first) around `fixation`, given as `(x, y)`.
///
/// The result inherits the calibration of `levels[0]`.
pub fn compose_foveated(
    levels: &[ImageBuffer],
    fixation: (usize, usize),
    config: &FoveationConfig,
) -> Result<ImageBuffer> {
    let first = levels
        .first()
        .ok_or_else(|| BlurError::DomainError("foveation needs at least one level".to_string()))?;
    let (height, width) = first.dimensions();
    let channels = first.channels();
    if levels
        .iter()
        .any(|l| l.dimensions() != (height, width) || l.channels() != channels)
    {
        return Err(BlurError::InvalidDimensions(width, height));
    }

    let (fx, fy) = (fixation.0 as f64, fixation.1 as f64);
    debug!(
        levels = levels.len(),
        inner_radius = config.inner_radius(levels.len()),
        "Compositing foveated image at ({}, {})",
        fixation.0,
        fixation.1
    );

    let mut data = Vec::with_capacity(height * width * channels);
    for row in 0..height {
        for col in 0..width {
            let distance = (col as f64 - fx).hypot(row as f64 - fy);
            let level = &levels[config.level_for_distance(distance, levels.len())];
            let start = (row * width + col) * channels;
            data.extend_from_slice(&level.samples()[start..start + channels]);
        }
    }

    let composite = ImageBuffer::new(height, width, channels, data)?;
    match first.pixels_per_degree() {
        Some(ppd) => composite.with_pixels_per_degree(ppd),
        None => Ok(composite),
    }
}
