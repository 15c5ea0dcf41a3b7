//! # Marker Library
//!
//! Assessment logic for submitted notebooks.
//!
//! ## Key Concepts
//! - **Notebook**: parsed view of a submitted `.ipynb`.
//! - **Originality**: similarity against the reference solution, mapped to a label
//!   through pluggable strategies and similarity measures.
//! - **Grading**: rubric scores from a [`Grader`](traits::grader::Grader), with a
//!   conservative fallback when grading is unavailable.
//! - **Completeness**: static advisories about what the notebook is missing.
//! - **Awards**: ranking of an assignment's history and the closing transition
//!   that records the winners.
//! - **Assessor**: runs originality, grading and completeness for one submission.

pub mod awards;
pub mod closing;
pub mod completeness;
pub mod error;
pub mod grading;
pub mod notebook;
pub mod originality;
pub mod similarity;
pub mod traits;

use serde::Serialize;
use std::sync::Arc;

use crate::completeness::CompletenessReport;
use crate::grading::{Evaluation, grade_or_fallback};
use crate::notebook::Notebook;
use crate::originality::{OriginalityClassifier, OriginalityLabel, OriginalityReport};
use crate::traits::grader::Grader;

/// Outcome of assessing one submission.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub originality: OriginalityReport,
    pub evaluation: Evaluation,
    pub completeness: CompletenessReport,
}

/// Assesses submissions against a reference notebook.
///
/// Built with a grader and, optionally, a custom classifier:
///
/// ```ignore
/// let assessor = Assessor::new(grader).with_classifier(OriginalityClassifier::default());
/// let assessment = assessor.assess(&submitted, &reference).await;
/// ```
pub struct Assessor {
    classifier: OriginalityClassifier,
    grader: Arc<dyn Grader>,
}

impl Assessor {
    pub fn new(grader: Arc<dyn Grader>) -> Self {
        Self {
            classifier: OriginalityClassifier::default(),
            grader,
        }
    }

    pub fn with_classifier(mut self, classifier: OriginalityClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &OriginalityClassifier {
        &self.classifier
    }

    /// Direct copies get a zero evaluation without calling the grader.
    /// Grading failures degrade to [`Evaluation::fallback`]. Completeness
    /// reasons are appended to the improvement list.
    pub async fn assess(&self, submitted: &Notebook, reference: &Notebook) -> Assessment {
        let originality = self.classifier.classify(submitted, reference);

        let mut evaluation = if originality.label == OriginalityLabel::DirectCopy {
            tracing::info!(similarity = originality.similarity, "direct copy, skipping grading");
            Evaluation::direct_copy()
        } else {
            grade_or_fallback(self.grader.as_ref(), submitted).await
        };

        let completeness = completeness::analyse(submitted);
        evaluation.improvements.extend(completeness.advisories());

        Assessment {
            originality,
            evaluation,
            completeness,
        }
    }
}
