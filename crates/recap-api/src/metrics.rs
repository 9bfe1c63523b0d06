//! Prometheus metrics for the API server (spec §4.19).

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "recap_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "recap_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "recap_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "recap_rate_limit_hits_total";
    pub const WEBHOOK_EVENTS_TOTAL: &str = "recap_webhook_events_total";
    pub const RUNS_STARTED_TOTAL: &str = "recap_runs_started_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", sanitize_path(endpoint))];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Record a received and accepted source-control webhook event.
pub fn record_webhook_event(event_type: &str) {
    let labels = [("event_type", event_type.to_string())];
    counter!(names::WEBHOOK_EVENTS_TOTAL, &labels).increment(1);
}

/// Record a pipeline run started via the HTTP trigger endpoint.
pub fn record_run_started(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::RUNS_STARTED_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels, so a run id or clip id in the path
/// doesn't blow up label cardinality.
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"^/api/runs/[^/]+$")
        .unwrap()
        .replace(path, "/api/runs/:run_id");
    let path = regex_lite::Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .unwrap()
        .replace_all(&path, ":id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/runs/20260727T120000Z-daily-abc123"),
            "/api/runs/:run_id"
        );
        assert_eq!(sanitize_path("/clips/stored"), "/clips/stored");
        assert_eq!(sanitize_path("/api/content/items"), "/api/content/items");
    }
}
