//! HTTP route definitions and handlers.
//!
//! The main listener serves the Cluster API metrics, the telemetry listener
//! the exporter's own metrics.

mod health_routes;
mod index_routes;
mod metrics_routes;
mod telemetry_routes;

use crate::state::AppState;
use axum::Router;

pub const METRICS_PATH: &str = "/metrics";
pub const HEALTHZ_PATH: &str = "/healthz";

/// Creates the router of the main listener.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(metrics_routes::routes())
        .merge(health_routes::routes())
        .merge(index_routes::routes())
        .with_state(state)
}

/// Creates the router of the telemetry listener.
pub fn create_telemetry_router(state: AppState) -> Router {
    Router::new()
        .merge(telemetry_routes::routes())
        .merge(index_routes::telemetry_routes())
        .with_state(state)
}
