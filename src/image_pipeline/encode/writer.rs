use std::io::Write;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::conversions::BlurConfig;

pub trait ImageWriter {
    /// File extension, without the dot, for files this writer produces.
    fn extension(&self) -> &'static str;
    fn write_image(&self, image: &ImageBuffer, output: &mut dyn Write, config: &BlurConfig) -> Result<()>;
}
