use std::io::{Cursor, Write};

use image::ExtendedColorType;
use tracing::debug;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::conversions::BlurConfig;
use crate::image_pipeline::encode::standard_tiff_writer::StandardTiffWriter;
use crate::image_pipeline::encode::types::OutputFormat;
use crate::image_pipeline::encode::writer::ImageWriter;

/// Writer for a fixed output format.
///
/// TIFF goes through [`StandardTiffWriter`] so the configured compression
/// applies; every other format is encoded by the image crate.
#[derive(Debug, Clone, Copy)]
pub struct StandardImageWriter {
    format: OutputFormat,
}

impl Default for StandardImageWriter {
    fn default() -> Self {
        Self::new(OutputFormat::Png)
    }
}

impl StandardImageWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

fn color_type(channels: usize) -> Result<ExtendedColorType> {
    match channels {
        1 => Ok(ExtendedColorType::L8),
        2 => Ok(ExtendedColorType::La8),
        3 => Ok(ExtendedColorType::Rgb8),
        4 => Ok(ExtendedColorType::Rgba8),
        other => Err(BlurError::EncodeError(format!(
            "cannot encode {other} channels"
        ))),
    }
}

impl ImageWriter for StandardImageWriter {
    fn extension(&self) -> &'static str {
        self.format.extension()
    }

    fn write_image(&self, image: &ImageBuffer, output: &mut dyn Write, config: &BlurConfig) -> Result<()> {
        if self.format == OutputFormat::Tiff {
            return StandardTiffWriter.write_image(image, output, config);
        }

        debug!(
            "Encoding {:?} image: {}x{}x{}",
            self.format,
            image.width(),
            image.height(),
            image.channels()
        );

        let color = color_type(image.channels())?;
        let samples = image.to_u8();
        let mut buffer = Cursor::new(Vec::new());

        image::write_buffer_with_format(
            &mut buffer,
            &samples,
            image.width() as u32,
            image.height() as u32,
            color,
            self.format.image_format(),
        )
        .map_err(|e| BlurError::EncodeError(e.to_string()))?;

        output.write_all(buffer.get_ref())?;

        debug!("{:?} encoding complete", self.format);
        Ok(())
    }
}
