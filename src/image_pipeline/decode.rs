//! Image decoding module
//!
//! Turns encoded image bytes into uncalibrated [`ImageBuffer`]s.
//!
//! [`ImageBuffer`]: crate::image_pipeline::ImageBuffer

mod reader;
mod standard_reader;

pub use reader::ImageReader;
pub use standard_reader::StandardImageReader;
