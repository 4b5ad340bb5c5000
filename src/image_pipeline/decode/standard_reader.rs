//! Image reader implementation using the image library.
//!
//! Supports every format the image crate is built with (PNG, JPEG, BMP, GIF,
//! TIFF, ...). Samples are decoded to 8 bits per channel.

use image::DynamicImage;
use tracing::debug;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::error::{BlurError, Result};
use crate::image_pipeline::decode::reader::ImageReader;

/// Reader backed by `image::load_from_memory`.
///
/// With `force_rgb` set (the default) every image is converted to three
/// channels so it can be filtered directly; otherwise the source channel
/// layout (grey, grey+alpha, RGB, RGBA) is preserved.
#[derive(Debug, Clone, Copy)]
pub struct StandardImageReader {
    force_rgb: bool,
}

impl Default for StandardImageReader {
    fn default() -> Self {
        Self { force_rgb: true }
    }
}

impl StandardImageReader {
    pub fn new(force_rgb: bool) -> Self {
        Self { force_rgb }
    }
}

fn into_samples(decoded: DynamicImage, force_rgb: bool) -> (usize, Vec<u8>) {
    if force_rgb {
        return (3, decoded.into_rgb8().into_raw());
    }
    match decoded.color().channel_count() {
        1 => (1, decoded.into_luma8().into_raw()),
        2 => (2, decoded.into_luma_alpha8().into_raw()),
        3 => (3, decoded.into_rgb8().into_raw()),
        _ => (4, decoded.into_rgba8().into_raw()),
    }
}

impl ImageReader for StandardImageReader {
    fn read_image(&self, data: &[u8]) -> Result<ImageBuffer> {
        debug!("Decoding image, {} bytes", data.len());

        let decoded =
            image::load_from_memory(data).map_err(|e| BlurError::DecodeError(e.to_string()))?;
        let width = decoded.width() as usize;
        let height = decoded.height() as usize;
        let source_color = decoded.color();

        let (channels, samples) = into_samples(decoded, self.force_rgb);

        debug!(
            "Decoded image: {}x{} ({:?} -> {} channels)",
            width, height, source_color, channels
        );

        ImageBuffer::from_u8(height, width, channels, &samples)
    }
}
