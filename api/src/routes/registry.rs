use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::response::ApiResponse;
use crate::services::ServiceError;
use crate::state::AppState;

pub fn registry_routes() -> Router<AppState> {
    Router::new().route("/", get(get_registry))
}

#[derive(Debug, Serialize)]
pub struct RegistryResponse {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

/// GET /api/registry
///
/// Roster with one column per assignment. Cells are empty, `✅` or an award marker.
async fn get_registry(State(state): State<AppState>) -> Response {
    match load_registry(&state).await {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiResponse::success(data, "Registry retrieved")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn load_registry(state: &AppState) -> Result<RegistryResponse, ServiceError> {
    let _guard = state.write_lock().lock().await;
    state.sync().pull().await?;
    let registry = state.registry().load()?;
    Ok(RegistryResponse {
        rows: registry.to_maps(),
        headers: registry.headers,
    })
}
