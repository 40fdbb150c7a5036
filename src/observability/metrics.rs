//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Install the process-wide Prometheus recorder
//! - Record per-request counters and latency
//! - Render the scrape text for `GET /metrics`
//!
//! # Metrics
//! - `http_requests_total` (counter): requests by method, path, status
//! - `http_request_duration_seconds` (histogram): latency by method, path
//!
//! # Design Decisions
//! - Metric updates are atomic increments on the hot path
//! - Path labels use the route template, not the raw URI, to bound cardinality

use std::sync::OnceLock;
use std::time::Instant;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once and return its handle.
///
/// If another recorder already owns the global slot, a detached recorder's
/// handle is returned; it renders an empty scrape.
pub fn install() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Record one completed request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();

    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(elapsed);
}

/// Current scrape text.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_is_idempotent() {
        let a = install();
        let b = install();
        record_request("GET", "/api/v1/health", 200, Instant::now());
        assert!(render(&a).contains("http_requests_total"));
        assert!(render(&b).contains("http_requests_total"));
    }

    #[test]
    fn test_request_counter_rendered() {
        let handle = install();
        record_request("POST", "/api/v1/pong", 200, Instant::now());
        let text = render(&handle);
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("path=\"/api/v1/pong\""));
    }
}
