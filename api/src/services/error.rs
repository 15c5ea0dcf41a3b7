use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use db::StorageError;
use marker::error::MarkerError;
use util::archive::ArchiveError;
use util::git::GitError;
use util::http::FetchError;

use crate::response::ApiResponse;

/// Failure of a portal workflow, mapped onto an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The upload itself is unacceptable (filename, roster, archive, notebook).
    #[error("{0}")]
    InputValidation(String),

    #[error("submissions for {assignment} closed at {deadline}")]
    SubmissionClosed {
        assignment: String,
        deadline: DateTime<FixedOffset>,
    },

    /// The reference notebook could not be obtained or used.
    #[error("reference unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The state repository could not be brought up to date.
    #[error("state repository out of sync: {0}")]
    PersistenceConflict(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InputValidation(_) => StatusCode::BAD_REQUEST,
            ServiceError::SubmissionClosed { .. } => StatusCode::FORBIDDEN,
            ServiceError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ServiceError::PersistenceConflict(_) => StatusCode::CONFLICT,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

impl From<ArchiveError> for ServiceError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Io(e) => ServiceError::Internal(e.to_string()),
            other => ServiceError::InputValidation(other.to_string()),
        }
    }
}

impl From<FetchError> for ServiceError {
    fn from(err: FetchError) -> Self {
        ServiceError::UpstreamUnavailable(err.to_string())
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnknownSubmitter(_) => ServiceError::InputValidation(err.to_string()),
            other => ServiceError::Storage(other),
        }
    }
}

impl From<GitError> for ServiceError {
    fn from(err: GitError) -> Self {
        ServiceError::PersistenceConflict(err.to_string())
    }
}

/// Only used for the submitted notebook; reference problems are mapped by the caller.
impl From<MarkerError> for ServiceError {
    fn from(err: MarkerError) -> Self {
        match err {
            MarkerError::MalformedArtifact(_) => ServiceError::InputValidation(err.to_string()),
            MarkerError::Config(_) => ServiceError::Internal(err.to_string()),
            MarkerError::UpstreamUnavailable(_) | MarkerError::InvalidResponse(_) => {
                ServiceError::UpstreamUnavailable(err.to_string())
            }
        }
    }
}
