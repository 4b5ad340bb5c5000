//! Frequency-domain low-pass filtering
//!
//! Builds a Gaussian mask whose width is tied to a cycles-per-degree cutoff
//! and applies it to each colour channel through a 2D DFT.

mod engine;
mod executor;
mod mask;
mod spectral;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::FilterEngine;
pub use executor::{ChannelExecutor, ChannelPlane, RayonExecutor, SequentialExecutor};
pub use mask::{FrequencyMask, build_mask};
pub use spectral::{SpectralKernel, SpectralPlan};
pub use types::{FilterConfig, FilterConfigBuilder, FilterMode, FilterOutcome, FilterReport};
