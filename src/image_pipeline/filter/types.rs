//! Filter configuration and reporting types

use std::fmt;

use crate::image_pipeline::buffer::ImageBuffer;
use crate::image_pipeline::common::timing::PipelineTimings;

/// How the per-channel work of a filter call is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Channels processed one after another on the calling thread
    #[default]
    Sequential,
    /// One worker task per channel
    Parallel,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Sequential => f.write_str("sequential"),
            FilterMode::Parallel => f.write_str("parallel"),
        }
    }
}

/// Configuration for the filter engine
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Worker thread count for parallel mode; `None` uses rayon's default
    pub threads: Option<usize>,
    /// Whether a parallel request may run sequentially when no parallel
    /// backend is available
    pub allow_fallback: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            threads: None,
            allow_fallback: true,
        }
    }
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }
}

/// Builder for FilterConfig
#[derive(Default)]
pub struct FilterConfigBuilder {
    threads: Option<Option<usize>>,
    allow_fallback: Option<bool>,
}

impl FilterConfigBuilder {
    pub fn threads(mut self, threads: Option<usize>) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn allow_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = Some(allow);
        self
    }

    pub fn build(self) -> FilterConfig {
        let default = FilterConfig::default();
        FilterConfig {
            threads: self.threads.unwrap_or(default.threads),
            allow_fallback: self.allow_fallback.unwrap_or(default.allow_fallback),
        }
    }
}

/// What actually happened during one filter call
#[derive(Debug, Clone)]
pub struct FilterReport {
    pub requested: FilterMode,
    pub executed: FilterMode,
    /// Set when a parallel request ran sequentially instead
    pub fallback_reason: Option<String>,
    /// Samples that fell outside `[0, 255]` before clipping
    pub clipped_samples: usize,
    pub timings: PipelineTimings,
}

impl FilterReport {
    pub fn fell_back(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub image: ImageBuffer,
    pub report: FilterReport,
}
