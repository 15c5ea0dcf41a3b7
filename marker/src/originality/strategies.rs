//! Built-in originality strategies.
//!
//! - [`DocumentOnly`]: one ratio over the whole canonical serialisation.
//! - [`DocumentAndCode`]: the whole-document ratio plus a ratio over the
//!   executable code lines. Rewording the prose around copied code does
//!   not lower the code ratio.

use crate::notebook::Notebook;
use crate::traits::similarity::SimilarityMeasure;
use crate::traits::strategy::{OriginalityStrategy, StrategyScores};

pub struct DocumentOnly;

impl OriginalityStrategy for DocumentOnly {
    fn name(&self) -> &'static str {
        "document"
    }

    fn score(
        &self,
        measure: &dyn SimilarityMeasure,
        submitted: &Notebook,
        reference: &Notebook,
    ) -> StrategyScores {
        StrategyScores {
            full_ratio: measure.ratio(&submitted.canonical_text(), &reference.canonical_text()),
            code_ratio: None,
        }
    }
}

pub struct DocumentAndCode;

impl OriginalityStrategy for DocumentAndCode {
    fn name(&self) -> &'static str {
        "document+code"
    }

    fn score(
        &self,
        measure: &dyn SimilarityMeasure,
        submitted: &Notebook,
        reference: &Notebook,
    ) -> StrategyScores {
        let full_ratio = measure.ratio(&submitted.canonical_text(), &reference.canonical_text());

        let submitted_code = submitted.executable_code();
        let reference_code = reference.executable_code();
        // Both empty scores 0.0, not the 1.0 the plain ratio gives two empty
        // strings: notebooks without code have no shared code to flag.
        let code_ratio = if submitted_code.is_empty() && reference_code.is_empty() {
            0.0
        } else {
            measure.ratio(&submitted_code, &reference_code)
        };

        StrategyScores {
            full_ratio,
            code_ratio: Some(code_ratio),
        }
    }
}
