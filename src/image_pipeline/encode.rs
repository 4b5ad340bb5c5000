//! Image encoding module
//!
//! Writers turn filtered buffers back into image files. TIFF output supports
//! configurable compression; other formats use the image crate's defaults.

mod standard_tiff_writer;
mod standard_writer;
pub mod types;
mod writer;


pub use standard_tiff_writer::StandardTiffWriter;
pub use standard_writer::StandardImageWriter;
pub use types::{OutputFormat, TiffCompression};
pub use writer::ImageWriter;
