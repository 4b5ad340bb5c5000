//! Radial Gaussian low-pass mask in unshifted DFT layout.

use crate::image_pipeline::common::error::{BlurError, Result};

/// Real-valued `(height, width)` attenuation matrix, row-major.
///
/// Index `(0, 0)` holds the zero frequency; indices past the midpoint of each
/// axis hold the negative frequencies, matching the output layout of an
/// unshifted 2D DFT.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMask {
    height: usize,
    width: usize,
    values: Vec<f64>,
}

impl FrequencyMask {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }
}

/// Signed frequency index for each position along an axis of length `len`.
///
/// Positions strictly past `len / 2` wrap to `i - len`.
pub(crate) fn wrapped_frequencies(len: usize) -> Vec<f64> {
    let half = len as f64 / 2.0;
    (0..len)
        .map(|i| {
            let f = i as f64;
            if f > half { f - len as f64 } else { f }
        })
        .collect()
}

/// Builds the low-pass mask for a `height` x `width` plane.
///
/// `sigma = pixels_per_degree * cycles_per_degree / 2` and each cell holds
/// `exp(-D^2 / sigma^2)` where `D` is the radial frequency distance.
pub fn build_mask(
    height: usize,
    width: usize,
    pixels_per_degree: f64,
    cycles_per_degree: f64,
) -> Result<FrequencyMask> {
    if !cycles_per_degree.is_finite() || cycles_per_degree <= 0.0 {
        return Err(BlurError::DomainError(format!(
            "cycles per degree must be positive, got {cycles_per_degree}"
        )));
    }
    if !pixels_per_degree.is_finite() || pixels_per_degree <= 0.0 {
        return Err(BlurError::DomainError(format!(
            "pixels per degree must be positive, got {pixels_per_degree}"
        )));
    }
    if height == 0 || width == 0 {
        return Err(BlurError::InvalidDimensions(width, height));
    }

    let sigma = pixels_per_degree * cycles_per_degree / 2.0;
    let sigma_sq = sigma * sigma;

    let u = wrapped_frequencies(height);
    let v = wrapped_frequencies(width);

    let mut values = Vec::with_capacity(height * width);
    for &ui in &u {
        for &vj in &v {
            let dist_sq = ui * ui + vj * vj;
            values.push((-dist_sq / sigma_sq).exp());
        }
    }

    Ok(FrequencyMask {
        height,
        width,
        values,
    })
}
