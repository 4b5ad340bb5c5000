//! Pipeline conversions module
//!
//! Orchestrates decoding, calibration, filtering and encoding of image files.

mod blur_pipeline;
pub mod types;


pub use blur_pipeline::{BlurPipeline, EncodedSample, sample_file_name};
pub use types::{BlurConfig, BlurConfigBuilder};
