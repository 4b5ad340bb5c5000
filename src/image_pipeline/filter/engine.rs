use std::sync::OnceLock;

use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::buffer::{ImageBuffer, MAX_INTENSITY, RGB_CHANNELS};
use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::common::timing::{PipelineTimings, Timer};
use crate::image_pipeline::filter::executor::{
    ChannelExecutor, ChannelPlane, RayonExecutor, SequentialExecutor,
};
use crate::image_pipeline::filter::mask::build_mask;
use crate::image_pipeline::filter::spectral::SpectralKernel;
use crate::image_pipeline::filter::types::{FilterConfig, FilterMode, FilterOutcome, FilterReport};

type ParallelBackend = std::result::Result<Box<dyn ChannelExecutor>, String>;

pub struct FilterEngine {
    sequential: Box<dyn ChannelExecutor>,
    /// Built on the first parallel request; `Err` holds why it is unavailable.
    parallel: OnceLock<ParallelBackend>,
    config: FilterConfig,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl FilterEngine {
    /// Creates an engine whose parallel mode runs on a rayon pool.
    ///
    /// The pool is built on the first parallel request. If it cannot be
    /// built, parallel requests follow [`FilterConfig::allow_fallback`].
    pub fn new(config: FilterConfig) -> Self {
        Self {
            sequential: Box::new(SequentialExecutor),
            parallel: OnceLock::new(),
            config,
        }
    }

    pub fn with_executors(
        sequential: Box<dyn ChannelExecutor>,
        parallel: Option<Box<dyn ChannelExecutor>>,
        config: FilterConfig,
    ) -> Self {
        let backend = parallel.ok_or_else(|| "no parallel backend configured".to_string());
        Self {
            sequential,
            parallel: OnceLock::from(backend),
            config,
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Whether parallel requests run in parallel. Builds the pool if needed.
    pub fn parallel_available(&self) -> bool {
        self.parallel_backend().is_ok()
    }

    fn parallel_backend(&self) -> std::result::Result<&dyn ChannelExecutor, &str> {
        self.parallel
            .get_or_init(|| {
                RayonExecutor::new(self.config.threads)
                    .map(|executor| Box::new(executor) as Box<dyn ChannelExecutor>)
                    .map_err(|e| e.to_string())
            })
            .as_ref()
            .map(|executor| &**executor)
            .map_err(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn parallel_initialised(&self) -> bool {
        self.parallel.get().is_some()
    }

    /// Low-pass filters `buffer` at `cycles_per_degree` and returns a new buffer.
    pub fn apply(
        &self,
        buffer: &ImageBuffer,
        cycles_per_degree: f64,
        mode: FilterMode,
    ) -> Result<ImageBuffer> {
        self.apply_with_report(buffer, cycles_per_degree, mode)
            .map(|outcome| outcome.image)
    }

    #[instrument(
        skip(self, buffer),
        fields(height = buffer.height(), width = buffer.width())
    )]
    pub fn apply_with_report(
        &self,
        buffer: &ImageBuffer,
        cycles_per_degree: f64,
        mode: FilterMode,
    ) -> Result<FilterOutcome> {
        let pixels_per_degree = buffer
            .pixels_per_degree()
            .ok_or_else(BlurError::calibration_required)?;
        if buffer.channels() != RGB_CHANNELS {
            return Err(BlurError::UnsupportedFormat {
                channels: buffer.channels(),
            });
        }

        let (executor, executed, fallback_reason) = self.select_executor(mode)?;
        let (height, width) = buffer.dimensions();
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("build_mask");
        let kernel = SpectralKernel::new(build_mask(
            height,
            width,
            pixels_per_degree,
            cycles_per_degree,
        )?);
        timings.record(timer);

        let planes: Vec<ChannelPlane> = (0..RGB_CHANNELS)
            .map(|index| ChannelPlane {
                index,
                samples: buffer.channel_plane(index),
            })
            .collect();

        let timer = Timer::start("spectral_filter");
        let filtered = executor.execute(planes, &kernel)?;
        timings.record(timer);

        let timer = Timer::start("assemble");
        let (planes, clipped_samples) = assemble_channels(filtered)?;
        let image = ImageBuffer::from_planes(height, width, &planes, Some(pixels_per_degree))?;
        timings.record(timer);

        if clipped_samples > 0 {
            debug!(clipped_samples, "Clipped out-of-range samples");
        }
        info!(
            cycles_per_degree,
            executor = executor.name(),
            "Low-pass filter applied in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );

        Ok(FilterOutcome {
            image,
            report: FilterReport {
                requested: mode,
                executed,
                fallback_reason,
                clipped_samples,
                timings,
            },
        })
    }

    fn select_executor(
        &self,
        mode: FilterMode,
    ) -> Result<(&dyn ChannelExecutor, FilterMode, Option<String>)> {
        if mode == FilterMode::Sequential {
            return Ok((self.sequential.as_ref(), FilterMode::Sequential, None));
        }

        match self.parallel_backend() {
            Ok(parallel) => Ok((parallel, FilterMode::Parallel, None)),
            Err(reason) => {
                if !self.config.allow_fallback {
                    return Err(BlurError::ConcurrencyUnavailable(reason.to_string()));
                }
                warn!("Parallel filtering unavailable ({}), continuing sequentially", reason);
                Ok((self.sequential.as_ref(), FilterMode::Sequential, Some(reason.to_string())))
            }
        }
    }
}

/// Places each filtered plane in the slot named by its channel index and
/// clips it to the intensity range. NaN samples become 0.
fn assemble_channels(filtered: Vec<ChannelPlane>) -> Result<(Vec<Vec<f64>>, usize)> {
    let mut slots: Vec<Option<Vec<f64>>> = vec![None; RGB_CHANNELS];
    let mut clipped = 0;

    for plane in filtered {
        let slot = slots.get_mut(plane.index).ok_or_else(|| {
            BlurError::ExecutionError(format!("unexpected channel index {}", plane.index))
        })?;
        if slot.is_some() {
            return Err(BlurError::ExecutionError(format!(
                "channel {} returned twice",
                plane.index
            )));
        }

        let mut samples = plane.samples;
        for v in samples.iter_mut() {
            if v.is_nan() {
                clipped += 1;
                *v = 0.0;
            } else if *v < 0.0 || *v > MAX_INTENSITY {
                clipped += 1;
                *v = v.clamp(0.0, MAX_INTENSITY);
            }
        }
        *slot = Some(samples);
    }

    let planes = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| BlurError::ExecutionError(format!("channel {index} missing")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((planes, clipped))
}
