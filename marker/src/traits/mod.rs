//!
//! Traits Module
//!
//! Extension points of the assessment pipeline:
//!
//! - [`similarity`]: how two texts are compared.
//! - [`strategy`]: which texts of two notebooks are compared.
//! - [`grader`]: who assigns the rubric scores.

pub mod grader;
pub mod similarity;
pub mod strategy;
