//! Progressive-blur batch generation
//!
//! A batch is a stack of filtered copies of one image, from a near-unblurred
//! level down to the requested cutoff, used to composite foveated images.

mod generator;
mod ladder;

#[cfg(test)]
mod tests;

pub use generator::{BatchSample, BatchSampleGenerator, BatchSamples};
pub use ladder::{CutoffLadder, DEFAULT_LADDER_START, DEFAULT_LADDER_STOP};
