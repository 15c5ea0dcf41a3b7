//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness and assignment status
//! - `/assignment` → current assignment details and the closing transition
//! - `/submissions` → notebook uploads
//! - `/registry` → roster and delivery status
//! - `/hall-of-fame` → current award standings

use crate::routes::{
    assignment::assignment_routes, hall_of_fame::hall_of_fame_routes, health::health_routes,
    registry::registry_routes, submissions::submission_routes,
};
use crate::state::AppState;
use axum::Router;

pub mod assignment;
pub mod hall_of_fame;
pub mod health;
pub mod registry;
pub mod submissions;

/// Builds the `/api` router with its state applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/assignment", assignment_routes())
        .nest("/submissions", submission_routes())
        .nest("/registry", registry_routes())
        .nest("/hall-of-fame", hall_of_fame_routes())
        .with_state(app_state)
}
