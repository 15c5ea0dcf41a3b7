//! # Similarity measures
//!
//! - [`sequence_ratio`]: longest-matching-blocks ratio over characters.

pub mod sequence_ratio;

pub use sequence_ratio::SequenceRatio;
