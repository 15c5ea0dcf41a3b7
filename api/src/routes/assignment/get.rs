use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Default)]
pub struct AssignmentResponse {
    pub id: String,
    pub column: String,
    pub deadline: String,
    pub open: bool,
    pub filename_pattern: String,
}

/// GET /api/assignment
///
/// ### Response
/// - `200 OK`
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": "Chapter 2",
///     "column": "Chapter 2",
///     "deadline": "2025-11-24T20:30:00+01:00",
///     "open": true,
///     "filename_pattern": "cap<number>-<name>.zip"
///   },
///   "message": "Assignment retrieved"
/// }
/// ```
pub async fn get_assignment(State(state): State<AppState>) -> impl IntoResponse {
    let assignment = &state.config().assignment;
    let data = AssignmentResponse {
        id: assignment.id.clone(),
        column: assignment.column.clone(),
        deadline: assignment.deadline.to_rfc3339(),
        open: !assignment.is_past_deadline(Utc::now()),
        filename_pattern: format!("{}<number>-<name>.zip", assignment.filename_prefix),
    };
    (
        StatusCode::OK,
        Json(ApiResponse::success(data, "Assignment retrieved")),
    )
}
