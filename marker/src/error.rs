//! Marker Error Types
//!
//! [`MarkerError`] covers everything that can go wrong while assessing a
//! submission: unreadable notebooks, an unreachable grading service, a
//! grading reply that cannot be interpreted, or missing grader settings.

/// Represents all error types that can occur while assessing a submission.
#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    /// The artifact is not a notebook that can be compared or graded.
    #[error("malformed notebook: {0}")]
    MalformedArtifact(String),

    /// The grading service could not be reached with any configured key.
    #[error("grading service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The grading service answered, but not with a usable evaluation.
    #[error("invalid grading response: {0}")]
    InvalidResponse(String),

    /// Grader settings are missing or unusable.
    #[error("grader configuration error: {0}")]
    Config(String),
}
