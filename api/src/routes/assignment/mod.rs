use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use get::get_assignment;
use post::close;

pub mod get;
pub mod post;

/// Routes for the assignment currently accepting submissions.
///
/// # Routes
///
/// - `GET /`
///   Identifier, deadline, whether uploads are open and the expected filename.
///
/// - `POST /close`
///   Records the awards once the deadline has passed. Repeated calls are no-ops.
pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_assignment))
        .route("/close", post(close))
}
