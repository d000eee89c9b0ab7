//! Per-request instrumentation.
//!
//! # Responsibilities
//! - Build the trace span for each request, tagged with its request ID
//! - Record request count and latency metrics
//!
//! Request IDs themselves come from `tower_http::request_id`; the header is
//! set before the span is created and copied onto the response.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;

use crate::observability::metrics;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id
    )
}

/// Middleware recording `devserve_requests_total` and request latency.
///
/// Latency is measured to the response head; streamed bodies finish later.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}
