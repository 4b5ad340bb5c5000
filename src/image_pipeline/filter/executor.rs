//! Execution backends for per-channel spectral filtering.

use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::filter::spectral::SpectralKernel;

/// One colour channel tagged with its position in the source buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPlane {
    pub index: usize,
    pub samples: Vec<f64>,
}

/// Runs the spectral kernel over a set of independent channel planes.
///
/// Implementations may return planes in any order; the engine reassembles
/// them by [`ChannelPlane::index`].
pub trait ChannelExecutor: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, planes: Vec<ChannelPlane>, kernel: &SpectralKernel)
    -> Result<Vec<ChannelPlane>>;
}

/// Filters channels one after another on the calling thread.
pub struct SequentialExecutor;

impl ChannelExecutor for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn execute(
        &self,
        planes: Vec<ChannelPlane>,
        kernel: &SpectralKernel,
    ) -> Result<Vec<ChannelPlane>> {
        Ok(planes
            .into_iter()
            .map(|plane| ChannelPlane {
                index: plane.index,
                samples: kernel.filter_plane(&plane.samples),
            })
            .collect())
    }
}

/// Filters each channel as its own task on a dedicated rayon pool.
pub struct RayonExecutor {
    pool: rayon::ThreadPool,
}

impl RayonExecutor {
    /// Builds the worker pool; `None` lets rayon pick the thread count.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        if threads == Some(0) {
            return Err(BlurError::ConcurrencyUnavailable(
                "worker thread count must be >= 1 when set".to_string(),
            ));
        }

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| {
            BlurError::ConcurrencyUnavailable(format!("failed to build rayon thread pool: {e}"))
        })?;

        debug!(threads = pool.current_num_threads(), "Parallel executor ready");
        Ok(Self { pool })
    }
}

impl ChannelExecutor for RayonExecutor {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn execute(
        &self,
        planes: Vec<ChannelPlane>,
        kernel: &SpectralKernel,
    ) -> Result<Vec<ChannelPlane>> {
        let filtered: Vec<ChannelPlane> = self.pool.install(|| {
            planes
                .into_par_iter()
                .map(|plane| ChannelPlane {
                    index: plane.index,
                    samples: kernel.filter_plane(&plane.samples),
                })
                .collect()
        });
        Ok(filtered)
    }
}
