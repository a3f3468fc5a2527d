#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use cluster_api_state_metrics::builder::BuiltStores;
use cluster_api_state_metrics::config::{extract_config, ConfigV1};
use cluster_api_state_metrics::handler::MetricsHandler;
use cluster_api_state_metrics::routes::{create_router, create_telemetry_router};
use cluster_api_state_metrics::startup::create_builder;
use cluster_api_state_metrics::state::AppState;
use cluster_api_state_metrics::store::{WatchClient, WatchParams, WatchStream};
use cluster_api_state_metrics::telemetry::Telemetry;
use figment::providers::{Format, Yaml};
use figment::Figment;
use flate2::read::GzDecoder;
use futures::channel::mpsc;
use futures::StreamExt;
use kube::api::{ApiResource, DynamicObject};
use kube::runtime::watcher;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower::ServiceExt;

pub type WatchResult = Result<watcher::Event<DynamicObject>, watcher::Error>;

/// Hands out test-controlled channels as watch streams, keyed by resource
/// plural and namespace. Unregistered watches stay silent.
#[derive(Default)]
pub struct ChannelWatchClient {
    streams: Mutex<HashMap<(String, Option<String>), mpsc::UnboundedReceiver<WatchResult>>>,
}

impl ChannelWatchClient {
    pub fn sender(&self, plural: &str, namespace: Option<&str>) -> mpsc::UnboundedSender<WatchResult> {
        let (tx, rx) = mpsc::unbounded();
        self.streams
            .lock()
            .unwrap()
            .insert((plural.to_string(), namespace.map(str::to_string)), rx);
        tx
    }
}

impl WatchClient for ChannelWatchClient {
    fn watch(&self, resource: &ApiResource, params: &WatchParams) -> WatchStream {
        let key = (resource.plural.clone(), params.namespace.clone());
        match self.streams.lock().unwrap().remove(&key) {
            Some(rx) => rx.boxed(),
            None => futures::stream::pending().boxed(),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub telemetry_router: Router,
    pub shutdown: watch::Sender<bool>,
    pub tasks: JoinSet<()>,
}

pub fn config_from_yaml(yaml: &str) -> ConfigV1 {
    extract_config(Figment::new().merge(Yaml::string(yaml))).expect("invalid test config")
}

/// Builds the stores and both routers; channels must be registered on
/// `client` before calling this.
pub fn build_app(config: &ConfigV1, client: Arc<ChannelWatchClient>) -> TestApp {
    let telemetry = Telemetry::new();
    let builder = create_builder(config, client, telemetry.clone()).expect("invalid builder config");
    let (shutdown, shutdown_rx) = watch::channel(false);
    let BuiltStores { writers, tasks } = builder.build(shutdown_rx).expect("failed to build stores");

    let state = AppState {
        handler: Arc::new(MetricsHandler::new(writers, config.enable_gzip_encoding)),
        telemetry,
    };

    TestApp {
        router: create_router(state.clone()),
        telemetry_router: create_telemetry_router(state),
        shutdown,
        tasks,
    }
}

pub async fn get(router: &Router, path: &str, accept_encoding: Option<&str>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut request = Request::builder().uri(path);
    if let Some(encoding) = accept_encoding {
        request = request.header("Accept-Encoding", encoding);
    }
    let request = request.body(Body::empty()).expect("failed to build request");

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

pub async fn get_text(router: &Router, path: &str) -> String {
    let (status, _, body) = get(router, path, None).await;
    assert_eq!(status, StatusCode::OK);
    String::from_utf8(body).unwrap()
}

/// Polls `/metrics` until `ready` accepts the body.
pub async fn metrics_when(router: &Router, ready: impl Fn(&str) -> bool) -> String {
    for _ in 0..200 {
        let body = get_text(router, "/metrics").await;
        if ready(&body) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("metrics never reached the expected state");
}

pub fn gunzip(body: &[u8]) -> String {
    let mut out = String::new();
    GzDecoder::new(body).read_to_string(&mut out).unwrap();
    out
}

pub fn object(kind: &str, name: &str, namespace: &str, extra: serde_json::Value) -> DynamicObject {
    let group = if kind == "KubeadmControlPlane" {
        "controlplane.cluster.x-k8s.io"
    } else {
        "cluster.x-k8s.io"
    };
    let mut value = serde_json::json!({
        "apiVersion": format!("{}/v1beta1", group),
        "kind": kind,
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{}-{}-uid", namespace, name),
            "creationTimestamp": "2017-08-01T06:30:18Z"
        }
    });
    if let (Some(target), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            target.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(value).unwrap()
}

pub fn cluster(name: &str, namespace: &str, phase: &str) -> DynamicObject {
    object("Cluster", name, namespace, serde_json::json!({"status": {"phase": phase}}))
}

pub fn applied(obj: DynamicObject) -> WatchResult {
    Ok(watcher::Event::Applied(obj))
}

pub fn deleted(obj: DynamicObject) -> WatchResult {
    Ok(watcher::Event::Deleted(obj))
}

pub fn restarted(objs: Vec<DynamicObject>) -> WatchResult {
    Ok(watcher::Event::Restarted(objs))
}
