use tracing::{debug, info, instrument};

use crate::image_pipeline::batch::ladder::CutoffLadder;
use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::filter::{FilterEngine, FilterMode};

/// One level of a progressive-blur stack.
#[derive(Debug, Clone)]
pub struct BatchSample {
    pub index: usize,
    pub cycles_per_degree: f64,
    pub image: ImageBuffer,
}

/// Produces stacks of progressively blurred copies of one calibrated image.
pub struct BatchSampleGenerator<'e> {
    engine: &'e FilterEngine,
    ladder: CutoffLadder,
    mode: FilterMode,
}

impl<'e> BatchSampleGenerator<'e> {
    pub fn new(engine: &'e FilterEngine, mode: FilterMode) -> Self {
        Self::with_ladder(engine, CutoffLadder::default(), mode)
    }

    pub fn with_ladder(engine: &'e FilterEngine, ladder: CutoffLadder, mode: FilterMode) -> Self {
        Self {
            engine,
            ladder,
            mode,
        }
    }

    /// Cutoffs of the stack, sharpest first; the last entry is `target_cpd`.
    pub fn cutoffs(&self, target_cpd: f64, sample_count: usize) -> Result<Vec<f64>> {
        if !target_cpd.is_finite() || target_cpd <= 0.0 {
            return Err(BlurError::DomainError(format!(
                "target cycles per degree must be positive, got {target_cpd}"
            )));
        }
        Ok(self.ladder.sample_cutoffs(target_cpd, sample_count))
    }

    /// Lazily filters each level in order. The iterator stops after the
    /// first error.
    pub fn samples<'a>(
        &'a self,
        buffer: &'a ImageBuffer,
        target_cpd: f64,
        sample_count: usize,
    ) -> Result<BatchSamples<'a>> {
        let cutoffs = self.cutoffs(target_cpd, sample_count)?;
        debug!(?cutoffs, "Sampled batch cutoffs");
        Ok(BatchSamples {
            engine: self.engine,
            buffer,
            mode: self.mode,
            cutoffs: cutoffs.into_iter().enumerate(),
            failed: false,
        })
    }

    /// Filters every level eagerly; any failing level fails the whole batch.
    #[instrument(skip(self, buffer), fields(height = buffer.height(), width = buffer.width()))]
    pub fn generate_batch(
        &self,
        buffer: &ImageBuffer,
        target_cpd: f64,
        sample_count: usize,
    ) -> Result<Vec<ImageBuffer>> {
        let images = self
            .samples(buffer, target_cpd, sample_count)?
            .map(|sample| sample.map(|s| s.image))
            .collect::<Result<Vec<_>>>()?;
        info!(levels = images.len(), "Batch generated");
        Ok(images)
    }
}

/// Single-pass iterator over the levels of a batch.
pub struct BatchSamples<'a> {
    engine: &'a FilterEngine,
    buffer: &'a ImageBuffer,
    mode: FilterMode,
    cutoffs: std::iter::Enumerate<std::vec::IntoIter<f64>>,
    failed: bool,
}

impl Iterator for BatchSamples<'_> {
    type Item = Result<BatchSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (index, cycles_per_degree) = self.cutoffs.next()?;

        match self.engine.apply(self.buffer, cycles_per_degree, self.mode) {
            Ok(image) => Some(Ok(BatchSample {
                index,
                cycles_per_degree,
                image,
            })),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.cutoffs.len()))
        }
    }
}
