use crate::notebook::Notebook;
use crate::traits::similarity::SimilarityMeasure;

/// Ratios produced by an [`OriginalityStrategy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyScores {
    /// Ratio over the canonical serialisation of the whole notebook.
    pub full_ratio: f64,
    /// Ratio over executable code only, when the strategy computes one.
    pub code_ratio: Option<f64>,
}

impl StrategyScores {
    /// The reported similarity: the highest of the computed ratios.
    pub fn similarity(&self) -> f64 {
        self.code_ratio.map_or(self.full_ratio, |c| self.full_ratio.max(c))
    }
}

/// Decides which views of two notebooks are compared.
pub trait OriginalityStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(
        &self,
        measure: &dyn SimilarityMeasure,
        submitted: &Notebook,
        reference: &Notebook,
    ) -> StrategyScores;
}
