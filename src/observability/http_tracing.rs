//! # HTTP Request Tracing Middleware
//!
//! Axum middleware that wraps every request in a `request_span!`, logs the
//! outcome and records Prometheus metrics.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;

use super::metrics::MetricsRecorder;

/// Metrics label for requests that matched no route
const UNMATCHED_PATH: &str = "unmatched";

/// Axum middleware that traces and measures each HTTP request
pub async fn trace_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = metrics_path(request.extensions().get::<MatchedPath>().map(MatchedPath::as_str));
    let start = Instant::now();

    let span = crate::request_span!(method, path);
    let response = next.run(request).instrument(span.clone()).await;

    let status_code = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if status_code >= 500 {
            tracing::error!(status_code, elapsed_ms, "request failed");
        } else if status_code >= 400 {
            tracing::warn!(status_code, elapsed_ms, "request rejected");
        } else {
            tracing::info!(status_code, elapsed_ms, "request completed");
        }
    });

    MetricsRecorder::new().record_http_request(
        &method,
        &route,
        status_code,
        start.elapsed().as_secs_f64(),
    );

    response
}

/// Route template used as the `path` label, so collection names, document ids
/// and index names never become label values. Unrouted requests share one label.
fn metrics_path(matched: Option<&str>) -> String {
    matched.unwrap_or(UNMATCHED_PATH).to_string()
}
