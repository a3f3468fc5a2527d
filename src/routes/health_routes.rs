//! Health check endpoints.

use super::HEALTHZ_PATH;
use crate::state::AppState;
use axum::{
    body::Body,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

/// Registers health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(HEALTHZ_PATH, get(health_check))
}

/// Returns 200 as long as the server is up; stores serve stale data rather
/// than failing.
async fn health_check() -> impl IntoResponse {
    Response::new(Body::from("OK"))
}
