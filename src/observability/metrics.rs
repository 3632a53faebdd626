//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by method, status
//! - `gateway_request_duration_seconds` (histogram): forwarding latency
//! - `gateway_rejected_total` (counter): admission rejections by reason
//! - `gateway_rate_limited_total` (counter): requests delayed by the bucket
//! - `gateway_rate_limit_delay_seconds` (histogram): applied delays
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so library users
//!   and tests pay nothing
//! - Prometheus exposition on a separate listener, enabled by config

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    if let Err(error) = PrometheusBuilder::new().with_http_listener(addr).install() {
        tracing::error!(error = %error, "Failed to start metrics exporter");
    } else {
        tracing::info!(address = %addr, "Metrics exporter started");
    }
}

/// Record a forwarded request and its latency.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an admission rejection.
pub fn record_rejected(reason: &'static str) {
    metrics::counter!("gateway_rejected_total", "reason" => reason).increment(1);
}

/// Record a rate limiter activation.
pub fn record_rate_limited(delay: Duration) {
    metrics::counter!("gateway_rate_limited_total").increment(1);
    metrics::histogram!("gateway_rate_limit_delay_seconds").record(delay.as_secs_f64());
}
