use crate::state::AppState;
use axum::{Router, extract::DefaultBodyLimit, routing::post};
use post::submit;

pub mod post;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Defines HTTP routes for notebook submissions.
///
/// # Routes
///
/// - `POST /`
///   Upload a `.zip` archive containing the notebook (multipart field `file`).
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
