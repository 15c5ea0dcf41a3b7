//! # Originality classification
//!
//! Compares a submitted notebook with the reference solution and maps the
//! resulting similarity to an [`OriginalityLabel`].
//!
//! Labels are assigned from the overall similarity `s` and the code-only
//! ratio `s_code`, first match wins:
//!
//! | condition                             | label          |
//! |---------------------------------------|----------------|
//! | `s > 0.95` or `s_code > 0.95`         | `DirectCopy`   |
//! | `s > 0.85` or `s_code > 0.90`         | `ModifiedCopy` |
//! | `s > 0.70`                            | `Inspired`     |
//! | otherwise                             | `Original`     |
//!
//! Comparisons use full precision; rounding happens only when the record is stored.

pub mod strategies;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use db::models::OriginalityLabel;

use crate::error::MarkerError;
use crate::notebook::Notebook;
use crate::similarity::SequenceRatio;
use crate::traits::similarity::SimilarityMeasure;
use crate::traits::strategy::OriginalityStrategy;
use strategies::DocumentAndCode;

/// Label boundaries. Each bound is exclusive: a score must exceed it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub direct_copy: f64,
    pub direct_copy_code: f64,
    pub modified_copy: f64,
    pub modified_copy_code: f64,
    pub inspired: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            direct_copy: 0.95,
            direct_copy_code: 0.95,
            modified_copy: 0.85,
            modified_copy_code: 0.90,
            inspired: 0.70,
        }
    }
}

impl ClassifierThresholds {
    pub fn label_for(&self, similarity: f64, code_ratio: Option<f64>) -> OriginalityLabel {
        let code = code_ratio.unwrap_or(0.0);
        if similarity > self.direct_copy || code > self.direct_copy_code {
            OriginalityLabel::DirectCopy
        } else if similarity > self.modified_copy || code > self.modified_copy_code {
            OriginalityLabel::ModifiedCopy
        } else if similarity > self.inspired {
            OriginalityLabel::Inspired
        } else {
            OriginalityLabel::Original
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OriginalityReport {
    pub label: OriginalityLabel,
    /// Highest of the computed ratios.
    pub similarity: f64,
    pub full_ratio: f64,
    pub code_ratio: Option<f64>,
}

/// Classifies submissions against a reference notebook.
///
/// Defaults to [`DocumentAndCode`] over [`SequenceRatio`].
pub struct OriginalityClassifier {
    thresholds: ClassifierThresholds,
    strategy: Box<dyn OriginalityStrategy>,
    measure: Box<dyn SimilarityMeasure>,
}

impl Default for OriginalityClassifier {
    fn default() -> Self {
        Self::new(ClassifierThresholds::default())
    }
}

impl OriginalityClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self {
            thresholds,
            strategy: Box::new(DocumentAndCode),
            measure: Box::new(SequenceRatio::new()),
        }
    }

    pub fn with_strategy<S>(mut self, strategy: S) -> Self
    where
        S: OriginalityStrategy + 'static,
    {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn with_measure<M>(mut self, measure: M) -> Self
    where
        M: SimilarityMeasure + 'static,
    {
        self.measure = Box::new(measure);
        self
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify(&self, submitted: &Notebook, reference: &Notebook) -> OriginalityReport {
        let scores = self.strategy.score(self.measure.as_ref(), submitted, reference);
        let similarity = scores.similarity();
        let label = self.thresholds.label_for(similarity, scores.code_ratio);

        tracing::debug!(
            strategy = self.strategy.name(),
            full_ratio = scores.full_ratio,
            code_ratio = ?scores.code_ratio,
            %label,
            "originality classified"
        );

        OriginalityReport {
            label,
            similarity,
            full_ratio: scores.full_ratio,
            code_ratio: scores.code_ratio,
        }
    }

    /// Parses both documents and classifies them. Either one failing to parse is an error.
    pub fn classify_values(
        &self,
        submitted: &Value,
        reference: &Value,
    ) -> Result<OriginalityReport, MarkerError> {
        let submitted = Notebook::from_value(submitted.clone())?;
        let reference = Notebook::from_value(reference.clone())?;
        Ok(self.classify(&submitted, &reference))
    }
}
