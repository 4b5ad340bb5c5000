use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlurError {
    #[error(
        "Display geometry is not square-pixel: horizontal={horizontal} deg/px, vertical={vertical} deg/px (mismatch {mismatch})"
    )]
    ConfigurationError {
        horizontal: f64,
        vertical: f64,
        mismatch: f64,
    },

    #[error("{0}")]
    PreconditionError(String),

    #[error("Value out of domain: {0}")]
    DomainError(String),

    #[error("Unsupported channel count: expected 3, got {channels}")]
    UnsupportedFormat { channels: usize },

    #[error("Parallel execution unavailable: {0}")]
    ConcurrencyUnavailable(String),

    #[error("Channel execution failed: {0}")]
    ExecutionError(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedOutput(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BlurError {
    pub(crate) fn calibration_required() -> Self {
        BlurError::PreconditionError("calibration required before filtering".to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlurError>;
