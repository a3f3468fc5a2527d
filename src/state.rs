//! Shared application state.

use std::sync::Arc;

use crate::handler::MetricsHandler;
use crate::telemetry::Telemetry;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Renders the Cluster API metric families.
    pub handler: Arc<MetricsHandler>,
    /// The exporter's own counters, served on the telemetry listener.
    pub telemetry: Telemetry,
}
