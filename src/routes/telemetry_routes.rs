//! The exporter's own metrics.

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};

use super::METRICS_PATH;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(METRICS_PATH, get(telemetry_handler))
}

async fn telemetry_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.telemetry.render(),
    )
}
