//! Image processing pipeline module
//!
//! This module provides a structured approach to perceptual blurring, with
//! separate modules for display calibration, spectral filtering, batch and
//! foveated generation, image decoding and encoding, and orchestration.

pub mod batch;
pub mod buffer;
pub mod calibration;
pub mod common;
pub mod conversions;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod foveation;

#[cfg(test)]
mod test_utils;

pub use common::{
    BlurError,
    Result,
};

pub use buffer::ImageBuffer;

pub use calibration::{
    DisplayGeometry,
    calc_pixels_per_degree,
};

pub use filter::{
    FilterConfig,
    FilterEngine,
    FilterMode,
    FilterOutcome,
    FilterReport,
    build_mask,
};

pub use batch::{
    BatchSample,
    BatchSampleGenerator,
    CutoffLadder,
};

pub use foveation::{
    FoveationConfig,
    compose_foveated,
};

pub use decode::{
    ImageReader,
    StandardImageReader,
};

pub use encode::{
    ImageWriter,
    OutputFormat,
    StandardImageWriter,
    StandardTiffWriter,
    TiffCompression,
};

pub use conversions::{
    BlurConfig,
    BlurConfigBuilder,
    BlurPipeline,
};
