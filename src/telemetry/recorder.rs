//! Telemetry recording implementation using Prometheus.

use prometheus::{
    register_int_counter_vec_with_registry, register_int_gauge_vec_with_registry, Encoder,
    IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording exporter telemetry.
pub trait TelemetryRecorder: Clone + Send + Sync + 'static {
    /// Records a watch event (`applied`, `deleted`, `restarted`) for a resource.
    fn record_watch_event(&self, resource: &str, event: &str);

    /// Records a failed list or watch call.
    fn record_watch_error(&self, resource: &str);

    /// Records an object that could not be decoded into its typed model.
    fn record_decode_error(&self, resource: &str);

    /// Sets the number of objects currently held by one store partition.
    fn set_store_objects(&self, resource: &str, namespace: &str, count: usize);
}

/// Prometheus telemetry collector.
#[derive(Clone)]
pub struct Telemetry {
    registry: Arc<Registry>,
    watch_events_total: IntCounterVec,
    watch_errors_total: IntCounterVec,
    decode_errors_total: IntCounterVec,
    store_objects: IntGaugeVec,
}

impl Telemetry {
    /// Creates a new telemetry instance with its own Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let watch_events_total = register_int_counter_vec_with_registry!(
            Opts::new(
                "cluster_api_state_metrics_watch_events_total",
                "Number of watch events applied to the stores"
            ),
            &["resource", "event"],
            registry.clone()
        )
        .expect("Failed to register watch_events_total");

        let watch_errors_total = register_int_counter_vec_with_registry!(
            Opts::new(
                "cluster_api_state_metrics_watch_errors_total",
                "Number of failed list or watch calls"
            ),
            &["resource"],
            registry.clone()
        )
        .expect("Failed to register watch_errors_total");

        let decode_errors_total = register_int_counter_vec_with_registry!(
            Opts::new(
                "cluster_api_state_metrics_decode_errors_total",
                "Number of watched objects that could not be decoded"
            ),
            &["resource"],
            registry.clone()
        )
        .expect("Failed to register decode_errors_total");

        let store_objects = register_int_gauge_vec_with_registry!(
            Opts::new(
                "cluster_api_state_metrics_store_objects",
                "Number of objects currently held per store"
            ),
            &["resource", "namespace"],
            registry.clone()
        )
        .expect("Failed to register store_objects");

        Telemetry {
            registry,
            watch_events_total,
            watch_errors_total,
            decode_errors_total,
            store_objects,
        }
    }

    /// Renders all telemetry in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode telemetry: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryRecorder for Telemetry {
    fn record_watch_event(&self, resource: &str, event: &str) {
        self.watch_events_total
            .with_label_values(&[resource, event])
            .inc();
    }

    fn record_watch_error(&self, resource: &str) {
        self.watch_errors_total.with_label_values(&[resource]).inc();
    }

    fn record_decode_error(&self, resource: &str) {
        self.decode_errors_total.with_label_values(&[resource]).inc();
    }

    fn set_store_objects(&self, resource: &str, namespace: &str, count: usize) {
        self.store_objects
            .with_label_values(&[resource, namespace])
            .set(count as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_values() {
        let telemetry = Telemetry::new();
        telemetry.record_watch_event("clusters", "applied");
        telemetry.record_watch_event("clusters", "applied");
        telemetry.record_watch_error("machines");
        telemetry.set_store_objects("clusters", "", 3);

        let text = telemetry.render();
        assert!(text.contains(
            "cluster_api_state_metrics_watch_events_total{event=\"applied\",resource=\"clusters\"} 2"
        ));
        assert!(text.contains("cluster_api_state_metrics_watch_errors_total{resource=\"machines\"} 1"));
        assert!(text.contains(
            "cluster_api_state_metrics_store_objects{namespace=\"\",resource=\"clusters\"} 3"
        ));
    }
}
