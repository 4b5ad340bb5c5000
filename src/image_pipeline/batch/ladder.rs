use crate::image_pipeline::common::error::{BlurError, Result};

/// First candidate cutoff, in hundredths of a cycle per degree.
pub const DEFAULT_LADDER_START: u32 = 4000;
/// Exclusive lower end of the default ladder, in hundredths.
pub const DEFAULT_LADDER_STOP: u32 = 50;

/// Strictly descending list of candidate cutoffs a batch is sampled from.
#[derive(Debug, Clone, PartialEq)]
pub struct CutoffLadder {
    candidates: Vec<f64>,
}

impl Default for CutoffLadder {
    /// 40.00 down to 0.51 cycles per degree in steps of 0.01.
    fn default() -> Self {
        Self {
            candidates: hundredths(DEFAULT_LADDER_START, DEFAULT_LADDER_STOP),
        }
    }
}

fn hundredths(start: u32, stop: u32) -> Vec<f64> {
    (stop.saturating_add(1)..=start)
        .rev()
        .map(|v| f64::from(v) / 100.0)
        .collect()
}

impl CutoffLadder {
    pub fn new(candidates: Vec<f64>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(BlurError::DomainError(
                "cutoff ladder must not be empty".to_string(),
            ));
        }
        if candidates.iter().any(|c| !c.is_finite() || *c <= 0.0) {
            return Err(BlurError::DomainError(
                "cutoff ladder values must be positive".to_string(),
            ));
        }
        if candidates.windows(2).any(|w| w[1] >= w[0]) {
            return Err(BlurError::DomainError(
                "cutoff ladder must be strictly descending".to_string(),
            ));
        }
        Ok(Self { candidates })
    }

    /// Ladder from `start / 100` down to, but excluding, `stop / 100`.
    pub fn from_hundredths(start: u32, stop: u32) -> Result<Self> {
        Self::new(hundredths(start, stop))
    }

    pub fn candidates(&self) -> &[f64] {
        &self.candidates
    }

    /// Number of candidates strictly sharper than `target`.
    pub fn count_above(&self, target: f64) -> usize {
        self.candidates.iter().take_while(|&&c| c > target).count()
    }

    /// Cutoffs for a batch of `sample_count + 1` levels.
    ///
    /// Samples follow a quarter circle over the candidates sharper than the
    /// target, so levels near the target are spaced densely and sharp levels
    /// sparsely. The result runs from sharpest to `target`, which is always
    /// the last entry.
    pub fn sample_cutoffs(&self, target: f64, sample_count: usize) -> Vec<f64> {
        let num_valid = self.count_above(target);
        let mut cutoffs = Vec::with_capacity(sample_count + 1);

        if num_valid == 0 {
            cutoffs.extend(std::iter::repeat_n(target, sample_count));
        } else {
            let n = sample_count as f64;
            for x in (1..=sample_count).rev() {
                let ratio = x as f64 / n;
                let y = (num_valid as f64 * (1.0 - ratio * ratio).sqrt()) as usize;
                cutoffs.push(self.candidates[y.min(num_valid - 1)]);
            }
        }

        cutoffs.push(target);
        cutoffs
    }
}
