//! Metrics exposition endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::{header, HeaderMap, HeaderValue, StatusCode};
use tracing::error;

use super::METRICS_PATH;
use crate::handler::CONTENT_TYPE;
use crate::state::AppState;
use crate::utils::HTTPError;

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route(METRICS_PATH, get(metrics_handler))
}

/// Renders every enabled store, gzip compressed when enabled and accepted.
async fn metrics_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, HTTPError> {
    let accept_encoding = headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|value| value.to_str().ok());

    let rendered = state.handler.render(accept_encoding).await.map_err(|e| {
        error!(
            event_name = "http.metrics.render_failed",
            event_domain = "http",
            "failed to render metrics: {}",
            e
        );
        HTTPError::internal("failed to render metrics")
    })?;

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        rendered.body,
    )
        .into_response();
    if rendered.gzip {
        response
            .headers_mut()
            .insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }
    Ok(response)
}
