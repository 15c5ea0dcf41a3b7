use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// Builds the `/health` route group.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub assignment: String,
    pub deadline: DateTime<FixedOffset>,
    /// `false` once the deadline has passed.
    pub accepting_submissions: bool,
}

/// GET /health
///
/// Liveness plus the assignment this instance serves. Reads configuration
/// only; the state repository is not touched.
///
/// ### Response
/// - `200 OK`
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "version": "0.1.0",
///     "assignment": "Chapter 2",
///     "deadline": "2025-11-10T23:59:00+01:00",
///     "accepting_submissions": true
///   },
///   "message": "Portal is up"
/// }
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let assignment = &state.config().assignment;
    let status = HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        assignment: assignment.id.clone(),
        deadline: assignment.deadline,
        accepting_submissions: !assignment.is_past_deadline(Utc::now()),
    };
    Json(ApiResponse::success(status, "Portal is up"))
}
