//!
//! # Grader Trait
//!
//! A [`Grader`] turns a notebook into an [`Evaluation`]. The production
//! implementation calls a hosted language model; tests plug in fixed
//! evaluations.

use async_trait::async_trait;

use crate::error::MarkerError;
use crate::grading::Evaluation;
use crate::notebook::Notebook;

#[async_trait]
pub trait Grader: Send + Sync {
    /// Grades `notebook` against the rubric.
    ///
    /// # Returns
    /// - `Ok(Evaluation)`: sub-scores within their caps and a total equal to their sum.
    /// - `Err(MarkerError)`: the grade could not be obtained.
    async fn grade(&self, notebook: &Notebook) -> Result<Evaluation, MarkerError>;
}
