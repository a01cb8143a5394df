//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reflector_requests_total` (counter): requests by method, status
//! - `reflector_request_duration_seconds` (histogram): handling latency
//!
//! Recording goes through the `metrics` facade and is a no-op until an
//! exporter is installed. Label values come from closed sets so that
//! arbitrary client input cannot create new series.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Label for a request method; extension methods collapse to `OTHER`.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::OPTIONS => "OPTIONS",
        Method::CONNECT => "CONNECT",
        Method::TRACE => "TRACE",
        _ => "OTHER",
    }
}

/// Record one completed request.
pub fn record_request(method: &Method, status: u16, start: Instant) {
    metrics::counter!(
        "reflector_requests_total",
        "method" => method_label(method),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("reflector_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_series(rendered: &str) -> usize {
        rendered
            .lines()
            .filter(|line| line.starts_with("reflector_requests_total{"))
            .count()
    }

    #[test]
    fn standard_methods_keep_their_name() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::TRACE), "TRACE");
        assert_eq!(method_label(&Method::from_bytes(b"PROPFIND").unwrap()), "OTHER");
    }

    #[test]
    fn invented_methods_share_one_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            for i in 0..200 {
                let method = Method::from_bytes(format!("RND{i}").as_bytes()).unwrap();
                record_request(&method, 200, Instant::now());
            }
            record_request(&Method::GET, 200, Instant::now());
        });

        let rendered = handle.render();
        assert_eq!(request_series(&rendered), 2);
        assert!(rendered.contains("method=\"OTHER\""));
        assert!(rendered.contains("method=\"GET\""));
    }
}
