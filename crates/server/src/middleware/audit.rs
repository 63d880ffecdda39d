//! Audit logging for requests that write to the MPI

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use super::request_id::RequestId;

/// Facade paths that create or change MPI records
const MUTATING_PATHS: [&str; 1] = ["/createpatient"];

/// Middleware to log MPI-mutating requests for audit purposes
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    // Run the request first to get the response status
    let response = next.run(request).await;

    if MUTATING_PATHS.iter().any(|p| uri.ends_with(p)) {
        let status = response.status().as_u16();

        tracing::info!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %uri,
            status = %status,
            "Mutation request"
        );
    }

    response
}
