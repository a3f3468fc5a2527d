//! Feeding stores from list/watch streams.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use kube::api::{Api, ApiResource, DynamicObject};
use kube::runtime::{watcher, WatchStreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::MetricsStore;
use crate::models::{store_key, KubeObject};
use crate::telemetry::{Telemetry, TelemetryRecorder};
use crate::utils::log_throttle::LogThrottle;

const WATCH_ERROR_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Events of one list/watch source. Errors are reported but do not end the
/// stream; retrying with backoff is the source's responsibility.
pub type WatchStream =
    BoxStream<'static, Result<watcher::Event<DynamicObject>, watcher::Error>>;

/// Where and how one partition of a resource is watched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchParams {
    /// `None` watches all namespaces.
    pub namespace: Option<String>,
    pub field_selector: Option<String>,
    /// List with `resourceVersion=0`, served from the API server cache
    /// instead of a quorum read.
    pub use_apiserver_cache: bool,
}

/// A client able to list and watch arbitrary resources.
pub trait WatchClient: Send + Sync {
    fn watch(&self, resource: &ApiResource, params: &WatchParams) -> WatchStream;
}

impl WatchClient for kube::Client {
    fn watch(&self, resource: &ApiResource, params: &WatchParams) -> WatchStream {
        let api: Api<DynamicObject> = match params.namespace.as_deref() {
            Some(ns) => Api::namespaced_with(self.clone(), ns, resource),
            None => Api::all_with(self.clone(), resource),
        };

        let mut config = watcher::Config::default();
        if let Some(selector) = params.field_selector.as_deref() {
            config = config.fields(selector);
        }
        if params.use_apiserver_cache {
            config = config.any_semantic();
        }

        watcher(api, config).default_backoff().boxed()
    }
}

/// Decodes a watched object into its typed model.
pub fn decode_object<K: KubeObject>(obj: DynamicObject) -> Result<K, serde_json::Error> {
    serde_json::to_value(obj).and_then(serde_json::from_value)
}

/// Background task applying the events of one stream to one store.
pub(crate) struct WatchTask<K> {
    resource: &'static str,
    namespace: String,
    store: Arc<MetricsStore<K>>,
    telemetry: Telemetry,
    error_throttle: LogThrottle,
}

impl<K: KubeObject> WatchTask<K> {
    pub(crate) fn new(
        resource: &'static str,
        namespace: Option<&str>,
        store: Arc<MetricsStore<K>>,
        telemetry: Telemetry,
    ) -> Self {
        WatchTask {
            resource,
            namespace: namespace.unwrap_or_default().to_string(),
            store,
            telemetry,
            error_throttle: LogThrottle::new(WATCH_ERROR_LOG_INTERVAL),
        }
    }

    /// Consumes `stream` until it ends or `shutdown` flips to `true` (or its
    /// sender is dropped).
    pub(crate) async fn run(mut self, mut stream: WatchStream, mut shutdown: watch::Receiver<bool>) {
        info!(
            event_name = "store.watch.started",
            event_domain = "store",
            resource = self.resource,
            namespace = self.namespace.as_str(),
            "starting watch"
        );

        if !*shutdown.borrow() {
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    next = stream.next() => {
                        match next {
                            Some(Ok(event)) => self.apply(event),
                            Some(Err(e)) => self.report_error(&e),
                            None => {
                                warn!(
                                    event_name = "store.watch.ended",
                                    event_domain = "store",
                                    resource = self.resource,
                                    namespace = self.namespace.as_str(),
                                    "watch stream ended, store keeps its last snapshot"
                                );
                                return;
                            }
                        }
                    }
                }
            }
        }

        info!(
            event_name = "store.watch.stopped",
            event_domain = "store",
            resource = self.resource,
            namespace = self.namespace.as_str(),
            "watch stopped"
        );
    }

    fn apply(&mut self, event: watcher::Event<DynamicObject>) {
        self.error_throttle.reset();
        match event {
            watcher::Event::Applied(obj) => {
                self.telemetry.record_watch_event(self.resource, "applied");
                if let Some(obj) = self.decode(obj) {
                    self.store.add(&obj);
                }
            }
            watcher::Event::Deleted(obj) => {
                self.telemetry.record_watch_event(self.resource, "deleted");
                self.store.delete(&store_key(&obj.metadata));
            }
            watcher::Event::Restarted(objs) => {
                self.telemetry.record_watch_event(self.resource, "restarted");
                let decoded: Vec<K> = objs.into_iter().filter_map(|o| self.decode(o)).collect();
                debug!(
                    event_name = "store.watch.relisted",
                    event_domain = "store",
                    resource = self.resource,
                    namespace = self.namespace.as_str(),
                    objects = decoded.len(),
                    "replacing store content"
                );
                self.store.replace(&decoded);
            }
        }
        self.telemetry
            .set_store_objects(self.resource, &self.namespace, self.store.len());
    }

    fn decode(&self, obj: DynamicObject) -> Option<K> {
        let name = obj.metadata.name.clone().unwrap_or_default();
        match decode_object::<K>(obj) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                self.telemetry.record_decode_error(self.resource);
                warn!(
                    event_name = "store.watch.decode_failed",
                    event_domain = "store",
                    resource = self.resource,
                    object = name.as_str(),
                    "skipping object that could not be decoded: {}",
                    e
                );
                None
            }
        }
    }

    fn report_error(&mut self, error: &watcher::Error) {
        self.telemetry.record_watch_error(self.resource);
        if let Some(suppressed) = self.error_throttle.should_emit() {
            warn!(
                event_name = "store.watch.failed",
                event_domain = "store",
                resource = self.resource,
                namespace = self.namespace.as_str(),
                suppressed,
                "list/watch failed, retrying with backoff: {}",
                error
            );
        }
    }
}
