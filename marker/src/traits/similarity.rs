/// A deterministic similarity ratio between two texts.
///
/// Implementations return a value in `[0, 1]`, where `1.0` means the texts
/// are identical and `0.0` means nothing aligns. Symmetry is not required.
pub trait SimilarityMeasure: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> f64;
}
