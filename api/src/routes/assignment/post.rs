use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use marker::closing::ClosingOutcome;

use crate::response::ApiResponse;
use crate::services::closing::close_current_assignment;
use crate::state::AppState;

/// POST /api/assignment/close
///
/// Ranks the assignment's history and writes the award markers into the
/// registry. Does nothing before the deadline or when markers already exist.
///
/// ### Responses
/// - `200 OK` with `data.outcome.status` one of `not_due`, `already_closed`,
///   `no_eligible`, `closed`
/// - `409 Conflict` when the state repository could not be pulled
/// - `500 Internal Server Error` when the tables cannot be read or written
pub async fn close(State(state): State<AppState>) -> Response {
    match close_current_assignment(&state, Utc::now()).await {
        Ok(report) => {
            let message = match &report.outcome {
                ClosingOutcome::NotDue => "Deadline has not passed yet",
                ClosingOutcome::AlreadyClosed => "Awards were already recorded",
                ClosingOutcome::NoEligible => "No eligible submissions to award",
                ClosingOutcome::Closed { .. } if report.synced => "Awards recorded",
                ClosingOutcome::Closed { .. } => "Awards recorded locally, push failed",
            };
            (StatusCode::OK, Json(ApiResponse::success(report, message))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
