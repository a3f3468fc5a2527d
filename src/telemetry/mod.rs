//! Self-observability of the exporter.
//!
//! Counts watch activity per resource so list/watch outages are visible on
//! the telemetry listener while `/metrics` keeps serving stale data.

mod recorder;

pub use recorder::{Telemetry, TelemetryRecorder};
