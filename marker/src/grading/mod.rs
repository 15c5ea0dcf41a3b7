//! # Grading
//!
//! An [`Evaluation`] is the rubric grade of one notebook. It can only be
//! built through [`Evaluation::from_parts`], which clamps each sub-score to
//! its cap and derives the total from the sub-scores. A total reported by
//! the grading service is never trusted.
//!
//! - [`llm_grader`]: grading through an OpenAI-compatible chat completion API.
//! - [`prompt`]: the rubric prompt sent to the model.

pub mod llm_grader;
pub mod prompt;

use serde::Serialize;

pub use db::models::SubScores;

use crate::notebook::Notebook;
use crate::traits::grader::Grader;

/// Maximum points per rubric category; they add up to 10.
pub const SCORE_CAPS: SubScores = SubScores {
    exploration: 2.0,
    preprocessing: 2.0,
    modeling: 3.0,
    evaluation: 2.0,
    documentation: 1.0,
};

pub const MAX_TOTAL: f64 = 10.0;

/// Where an evaluation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSource {
    Model,
    /// The grading service was unavailable; a conservative default was used.
    Fallback,
    /// The submission is a copy of the reference and was not graded.
    DirectCopy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub scores: SubScores,
    pub total: f64,
    pub comment: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub source: EvaluationSource,
}

#[inline]
fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn clamp_score(value: f64, cap: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, cap) } else { 0.0 }
}

impl Evaluation {
    pub fn from_parts(
        scores: SubScores,
        comment: impl Into<String>,
        strengths: Vec<String>,
        improvements: Vec<String>,
        source: EvaluationSource,
    ) -> Self {
        let scores = SubScores {
            exploration: clamp_score(scores.exploration, SCORE_CAPS.exploration),
            preprocessing: clamp_score(scores.preprocessing, SCORE_CAPS.preprocessing),
            modeling: clamp_score(scores.modeling, SCORE_CAPS.modeling),
            evaluation: clamp_score(scores.evaluation, SCORE_CAPS.evaluation),
            documentation: clamp_score(scores.documentation, SCORE_CAPS.documentation),
        };
        Self {
            total: round1(scores.sum()),
            scores,
            comment: comment.into(),
            strengths,
            improvements,
            source,
        }
    }

    /// Default used when the grading service cannot be reached.
    pub fn fallback() -> Self {
        Self::from_parts(
            SubScores {
                exploration: 0.5,
                documentation: 0.5,
                ..SubScores::default()
            },
            "Automatic grading was unavailable. A provisional grade was recorded and the notebook needs manual review.",
            Vec::new(),
            vec!["Ask the instructor for a manual review of this submission.".to_string()],
            EvaluationSource::Fallback,
        )
    }

    /// Zero grade for a copy of the reference solution.
    pub fn direct_copy() -> Self {
        Self::from_parts(
            SubScores::default(),
            "The submission is a direct copy of the reference solution and was not graded.",
            Vec::new(),
            vec!["Submit your own work.".to_string()],
            EvaluationSource::DirectCopy,
        )
    }
}

/// Grades with `grader`, substituting [`Evaluation::fallback`] on any failure.
pub async fn grade_or_fallback(grader: &dyn Grader, notebook: &Notebook) -> Evaluation {
    match grader.grade(notebook).await {
        Ok(evaluation) => evaluation,
        Err(err) => {
            tracing::warn!(error = %err, "grading failed, using fallback evaluation");
            Evaluation::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarkerError;
    use async_trait::async_trait;
    use serde_json::json;

    fn assert_total_matches(e: &Evaluation) {
        assert!((e.scores.sum() - e.total).abs() <= 0.05, "{e:?}");
        assert!(e.total >= 0.0 && e.total <= MAX_TOTAL);
    }

    #[test]
    fn caps_add_up_to_ten() {
        assert_eq!(SCORE_CAPS.sum(), MAX_TOTAL);
    }

    #[test]
    fn scores_are_clamped_and_total_recomputed() {
        let e = Evaluation::from_parts(
            SubScores {
                exploration: 5.0,
                preprocessing: -1.0,
                modeling: 2.3,
                evaluation: f64::NAN,
                documentation: 0.8,
            },
            "ok",
            vec![],
            vec![],
            EvaluationSource::Model,
        );
        assert_eq!(e.scores.exploration, 2.0);
        assert_eq!(e.scores.preprocessing, 0.0);
        assert_eq!(e.scores.evaluation, 0.0);
        assert_eq!(e.total, 5.1);
        assert_total_matches(&e);
    }

    #[test]
    fn fallback_and_direct_copy_are_consistent() {
        let f = Evaluation::fallback();
        assert_eq!(f.total, 1.0);
        assert_eq!(f.source, EvaluationSource::Fallback);
        assert_total_matches(&f);

        let d = Evaluation::direct_copy();
        assert_eq!(d.total, 0.0);
        assert_total_matches(&d);
    }

    struct Failing;

    #[async_trait]
    impl Grader for Failing {
        async fn grade(&self, _: &Notebook) -> Result<Evaluation, MarkerError> {
            Err(MarkerError::UpstreamUnavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_fallback() {
        let nb = Notebook::from_value(json!({ "cells": [] })).unwrap();
        let e = grade_or_fallback(&Failing, &nb).await;
        assert_eq!(e, Evaluation::fallback());
    }
}
