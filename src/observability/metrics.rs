//! Metrics collection and exposition.
//!
//! # Metrics
//! - `s3_proxy_requests_total` (counter): proxied requests by method, status
//! - `s3_proxy_request_duration_seconds` (histogram): time until the body is sent or abandoned
//! - `s3_proxy_backend_errors_total` (counter): backend failures by error code
//! - `s3_proxy_bytes_streamed_total` (counter): object bytes forwarded to clients
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "s3_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("s3_proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// `code` is the backend error code, or `"opaque"` when there was none.
pub fn record_backend_error(code: &str) {
    counter!("s3_proxy_backend_errors_total", "code" => code.to_string()).increment(1);
}

pub fn record_bytes_streamed(bytes: u64) {
    counter!("s3_proxy_bytes_streamed_total").increment(bytes);
}
