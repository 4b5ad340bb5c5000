//! Pipeline configuration types

use crate::image_pipeline::calibration::DisplayGeometry;
use crate::image_pipeline::encode::TiffCompression;
use crate::image_pipeline::filter::{FilterConfig, FilterMode};
use crate::image_pipeline::foveation::FoveationConfig;

/// Configuration for the blur pipeline
#[derive(Debug, Clone)]
pub struct BlurConfig {
    /// Display the output is calibrated for
    pub geometry: DisplayGeometry,
    /// Sequential or per-channel parallel filtering
    pub mode: FilterMode,
    /// Worker threads for parallel mode (`None` = rayon default)
    pub threads: Option<usize>,
    /// Run sequentially instead of failing when parallel mode is unavailable
    pub allow_fallback: bool,
    /// Compression method for TIFF output
    pub compression: TiffCompression,
    /// Predictor value for TIFF compression (2 = horizontal differencing)
    pub predictor: Option<u16>,
    /// Whether to validate image dimensions after decoding
    pub validate_dimensions: bool,
    /// Largest accepted width or height when validating
    pub max_dimension: Option<usize>,
    /// Ring layout for foveated output
    pub foveation: FoveationConfig,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            geometry: DisplayGeometry::default(),
            mode: FilterMode::Sequential,
            threads: None,
            allow_fallback: true,
            compression: TiffCompression::None,
            predictor: None,
            validate_dimensions: true,
            max_dimension: Some(50000),
            foveation: FoveationConfig::default(),
        }
    }
}

impl BlurConfig {
    pub fn builder() -> BlurConfigBuilder {
        BlurConfigBuilder::default()
    }

    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig::builder()
            .threads(self.threads)
            .allow_fallback(self.allow_fallback)
            .build()
    }
}

/// Builder for BlurConfig
#[derive(Default)]
pub struct BlurConfigBuilder {
    geometry: Option<DisplayGeometry>,
    mode: Option<FilterMode>,
    threads: Option<Option<usize>>,
    allow_fallback: Option<bool>,
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    foveation: Option<FoveationConfig>,
}

impl BlurConfigBuilder {
    pub fn geometry(mut self, geometry: DisplayGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn allow_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = Some(allow);
        self
    }

    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn foveation(mut self, foveation: FoveationConfig) -> Self {
        self.foveation = Some(foveation);
        self
    }

    pub fn build(self) -> BlurConfig {
        let default = BlurConfig::default();
        BlurConfig {
            geometry: self.geometry.unwrap_or(default.geometry),
            mode: self.mode.unwrap_or(default.mode),
            threads: self.threads.unwrap_or(default.threads),
            allow_fallback: self.allow_fallback.unwrap_or(default.allow_fallback),
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            foveation: self.foveation.unwrap_or(default.foveation),
        }
    }
}
