//! Calibrated pixel matrix shared by every stage of the pipeline.

use crate::image_pipeline::calibration::DisplayGeometry;
use crate::image_pipeline::common::error::{BlurError, Result};

/// Upper bound of the intensity range; samples are clipped to `[0, MAX_INTENSITY]`.
pub const MAX_INTENSITY: f64 = 255.0;

/// Channel count required by the spectral filter.
pub const RGB_CHANNELS: usize = 3;

/// Row-major `(height, width, channels)` sample matrix with an optional
/// pixels-per-degree calibration constant.
///
/// Every transform returns a new buffer; a buffer is never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f64>,
    pixels_per_degree: Option<f64>,
}

impl ImageBuffer {
    /// Builds an uncalibrated buffer from interleaved samples.
    ///
    /// Fails with [`BlurError::InvalidDimensions`] if any dimension is zero or
    /// `data.len()` does not equal `height * width * channels`, and with
    /// [`BlurError::DomainError`] if any sample is NaN or infinite.
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<f64>) -> Result<Self> {
        if height == 0 || width == 0 || channels == 0 {
            return Err(BlurError::InvalidDimensions(width, height));
        }
        let expected = height
            .checked_mul(width)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(BlurError::InvalidDimensions(width, height))?;
        if data.len() != expected {
            return Err(BlurError::InvalidDimensions(width, height));
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(BlurError::DomainError(format!(
                "sample {pos} is not finite: {}",
                data[pos]
            )));
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
            pixels_per_degree: None,
        })
    }

    pub fn from_u8(height: usize, width: usize, channels: usize, data: &[u8]) -> Result<Self> {
        Self::new(
            height,
            width,
            channels,
            data.iter().map(|&v| f64::from(v)).collect(),
        )
    }

    pub fn filled(height: usize, width: usize, channels: usize, value: f64) -> Result<Self> {
        let len = height.saturating_mul(width).saturating_mul(channels);
        Self::new(height, width, channels, vec![value; len])
    }

    /// Reassembles a buffer from per-channel planes, in plane order.
    pub(crate) fn from_planes(
        height: usize,
        width: usize,
        planes: &[Vec<f64>],
        pixels_per_degree: Option<f64>,
    ) -> Result<Self> {
        let channels = planes.len();
        let pixels = height * width;
        if planes.iter().any(|p| p.len() != pixels) {
            return Err(BlurError::InvalidDimensions(width, height));
        }

        let mut data = Vec::with_capacity(pixels * channels);
        for idx in 0..pixels {
            for plane in planes {
                data.push(plane[idx]);
            }
        }

        let mut buffer = Self::new(height, width, channels, data)?;
        buffer.pixels_per_degree = pixels_per_degree;
        Ok(buffer)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width)`, the axis order used throughout the crate.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn samples(&self) -> &[f64] {
        &self.data
    }

    pub fn sample(&self, row: usize, col: usize, channel: usize) -> f64 {
        self.data[(row * self.width + col) * self.channels + channel]
    }

    pub fn pixels_per_degree(&self) -> Option<f64> {
        self.pixels_per_degree
    }

    pub fn is_calibrated(&self) -> bool {
        self.pixels_per_degree.is_some()
    }

    /// Returns a copy calibrated for the given viewing geometry.
    pub fn calibrate(&self, geometry: &DisplayGeometry) -> Result<Self> {
        let ppd = geometry.pixels_per_degree()?;
        self.clone().with_pixels_per_degree(ppd)
    }

    /// Attaches a known pixels-per-degree constant, replacing any previous one.
    pub fn with_pixels_per_degree(mut self, pixels_per_degree: f64) -> Result<Self> {
        if !pixels_per_degree.is_finite() || pixels_per_degree <= 0.0 {
            return Err(BlurError::DomainError(format!(
                "pixels per degree must be positive, got {pixels_per_degree}"
            )));
        }
        self.pixels_per_degree = Some(pixels_per_degree);
        Ok(self)
    }

    /// Copies one channel out as a contiguous row-major plane.
    pub fn channel_plane(&self, channel: usize) -> Vec<f64> {
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
            .collect()
    }

    pub fn channel_mean(&self, channel: usize) -> f64 {
        let plane = self.channel_plane(channel);
        plane.iter().sum::<f64>() / plane.len() as f64
    }

    /// Quantises to 8-bit samples, rounding to nearest after clipping.
    pub fn to_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| v.clamp(0.0, MAX_INTENSITY).round() as u8)
            .collect()
    }
}
