//! Per-request access log and request metrics.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::observability::metrics;
use crate::reflection::extract;

/// Logs one line per request when `enabled`; always records metrics.
pub async fn access_log(State(enabled): State<bool>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let remote_addr = extract::remote_addr(request.extensions());
    let client_ip = extract::client_ip(request.headers(), &remote_addr);

    let response = next.run(request).await;
    let status = response.status().as_u16();

    metrics::record_request(&method, status, start);
    if enabled {
        tracing::info!(
            method = %method,
            uri = %uri,
            client_ip = %client_ip,
            remote_addr = %remote_addr,
            status,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Request served"
        );
    }
    response
}
