use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use marker::awards::Award;
use serde::Serialize;

use crate::response::ApiResponse;
use crate::services::closing::provisional_awards;
use crate::state::AppState;

pub fn hall_of_fame_routes() -> Router<AppState> {
    Router::new().route("/", get(get_hall_of_fame))
}

#[derive(Debug, Serialize)]
pub struct HallOfFameEntry {
    pub award: Award,
    pub title: &'static str,
    pub marker: &'static str,
    pub submitter: String,
    pub score: f64,
}

/// GET /api/hall-of-fame
///
/// Standings computed from the current history. Before closing these are
/// provisional; the registry is not modified.
///
/// ```json
/// {
///   "success": true,
///   "data": [
///     { "award": "BestOverall", "title": "Best Overall", "marker": "🏆", "submitter": "alice", "score": 8.1 }
///   ],
///   "message": "Hall of fame retrieved"
/// }
/// ```
async fn get_hall_of_fame(State(state): State<AppState>) -> Response {
    match provisional_awards(&state).await {
        Ok(awards) => {
            let entries: Vec<HallOfFameEntry> = awards
                .iter()
                .map(|(award, winner)| HallOfFameEntry {
                    award,
                    title: award.display_name(),
                    marker: award.marker(),
                    submitter: winner.submitter.clone(),
                    score: winner.score,
                })
                .collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(entries, "Hall of fame retrieved")),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
