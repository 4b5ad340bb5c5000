use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::image_pipeline::filter::mask::FrequencyMask;

/// Planned row and column transforms for one `(height, width)` plane.
///
/// Plans are immutable and `Send + Sync`, so one plan is shared by every
/// channel worker.
pub struct SpectralPlan {
    height: usize,
    width: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl SpectralPlan {
    pub fn new(height: usize, width: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            height,
            width,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            col_forward: planner.plan_fft_forward(height),
            col_inverse: planner.plan_fft_inverse(height),
        }
    }

    pub fn forward(&self, buffer: &mut [Complex<f64>], scratch: &mut [Complex<f64>]) {
        self.transform(buffer, scratch, &self.row_forward, &self.col_forward);
    }

    /// Unnormalised inverse; callers divide by `height * width`.
    pub fn inverse(&self, buffer: &mut [Complex<f64>], scratch: &mut [Complex<f64>]) {
        self.transform(buffer, scratch, &self.row_inverse, &self.col_inverse);
    }

    fn transform(
        &self,
        buffer: &mut [Complex<f64>],
        scratch: &mut [Complex<f64>],
        rows: &Arc<dyn Fft<f64>>,
        cols: &Arc<dyn Fft<f64>>,
    ) {
        rows.process(buffer);
        transpose(buffer, scratch, self.height, self.width);
        cols.process(scratch);
        transpose(scratch, buffer, self.width, self.height);
    }
}

/// Writes the transpose of a row-major `rows x cols` matrix into `dst`.
fn transpose(src: &[Complex<f64>], dst: &mut [Complex<f64>], rows: usize, cols: usize) {
    for r in 0..rows {
        for c in 0..cols {
            dst[c * rows + r] = src[r * cols + c];
        }
    }
}

/// Mask plus transform plans: everything a channel worker reads.
pub struct SpectralKernel {
    plan: SpectralPlan,
    mask: FrequencyMask,
}

impl SpectralKernel {
    pub fn new(mask: FrequencyMask) -> Self {
        Self {
            plan: SpectralPlan::new(mask.height(), mask.width()),
            mask,
        }
    }

    /// Forward DFT, mask multiply, inverse DFT; returns the real part.
    pub fn filter_plane(&self, samples: &[f64]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        let mut scratch = vec![Complex::new(0.0, 0.0); buffer.len()];

        self.plan.forward(&mut buffer, &mut scratch);
        for (value, &gain) in buffer.iter_mut().zip(self.mask.values()) {
            *value *= gain;
        }
        self.plan.inverse(&mut buffer, &mut scratch);

        let norm = 1.0 / buffer.len() as f64;
        buffer.iter().map(|c| c.re * norm).collect()
    }
}
