use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

const METRICS_INDEX: &str = r#"<html>
<head><title>Cluster-API Metrics Server</title></head>
<body>
<h1>Cluster-API Metrics</h1>
<ul>
<li><a href="/metrics">metrics</a></li>
<li><a href="/healthz">healthz</a></li>
</ul>
</body>
</html>"#;

const TELEMETRY_INDEX: &str = r#"<html>
<head><title>Cluster-API-State-Metrics Metrics Server</title></head>
<body>
<h1>Cluster-API-State-Metrics Metrics</h1>
<ul>
<li><a href="/metrics">metrics</a></li>
</ul>
</body>
</html>"#;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(|| async { Html(METRICS_INDEX) }))
}

pub fn telemetry_routes() -> Router<AppState> {
    Router::new().route("/", get(|| async { Html(TELEMETRY_INDEX) }))
}
