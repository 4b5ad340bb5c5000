use std::io::Write;

use tiff::encoder::colortype::{Gray8, RGB8, RGBA8};
use tiff::encoder::{Compression, TiffEncoder, compression::DeflateLevel};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::conversions::BlurConfig;
use crate::image_pipeline::encode::types::TiffCompression;
use crate::image_pipeline::encode::writer::ImageWriter;

pub struct StandardTiffWriter;

impl ImageWriter for StandardTiffWriter {
    fn extension(&self) -> &'static str {
        "tiff"
    }

    fn write_image(&self, image: &ImageBuffer, output: &mut dyn Write, config: &BlurConfig) -> Result<()> {
        debug!(
            "Encoding TIFF image: {}x{}x{}",
            image.width(),
            image.height(),
            image.channels()
        );

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::Deflate => Compression::Deflate(DeflateLevel::Balanced),
        };

        let width = image.width() as u32;
        let height = image.height() as u32;
        let samples = image.to_u8();
        let mut buffer = Vec::new();

        {
            let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
                .map_err(|e| BlurError::EncodeError(e.to_string()))?
                .with_compression(compression);

            if let Some(predictor_val) = config.predictor {
                let predictor = match predictor_val {
                    2 => Predictor::Horizontal,
                    _ => Predictor::None,
                };
                encoder = encoder.with_predictor(predictor);
            }

            let written = match image.channels() {
                1 => encoder.write_image::<Gray8>(width, height, &samples),
                3 => encoder.write_image::<RGB8>(width, height, &samples),
                4 => encoder.write_image::<RGBA8>(width, height, &samples),
                other => {
                    return Err(BlurError::EncodeError(format!(
                        "TIFF output does not support {other} channels"
                    )));
                }
            };
            written.map_err(|e| BlurError::EncodeError(e.to_string()))?;
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
