//! Prometheus metrics collection middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds`
//! (histogram) for every request, with method/path/status labels.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::FACADE_PREFIX;

const FACADE_ENDPOINTS: [&str; 3] = ["/searchpatient", "/createpatient", "/cbencounter"];

/// Collapse unknown paths into one label to keep cardinality bounded
fn normalize_path(path: &str) -> String {
    let known = matches!(path, "/health" | "/metrics")
        || path
            .strip_prefix(FACADE_PREFIX)
            .is_some_and(|endpoint| FACADE_ENDPOINTS.contains(&endpoint));

    if known {
        path.to_string()
    } else {
        "unmatched".to_string()
    }
}

/// Middleware that records request count and duration metrics.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}
