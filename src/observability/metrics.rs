//! Metrics collection and exposition.
//!
//! # Metrics
//! - `guard_requests_total` (counter): verified requests by outcome
//! - `guard_rejections_total` (counter): rejections by reason
//! - `vendor_requests_total` (counter): vendor calls by operation and status
//! - `vendor_request_duration_seconds` (histogram): vendor latency
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Status `0` labels calls that never got a response

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a verification outcome (`authorized` or `rejected`).
pub fn record_verification(outcome: &'static str) {
    counter!("guard_requests_total", "outcome" => outcome).increment(1);
}

/// Count a rejection by reason.
pub fn record_rejection(reason: &'static str) {
    counter!("guard_rejections_total", "reason" => reason).increment(1);
}

/// Record a vendor call.
pub fn record_vendor_request(operation: &'static str, status: u16, start: Instant) {
    counter!(
        "vendor_requests_total",
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("vendor_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
