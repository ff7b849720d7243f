//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_rate_limit_decisions_total` (counter): limiter outcomes by group
//! - `gateway_maintenance_blocks_total` (counter): blocked requests by kind (api/page)
//! - `gateway_admin_checks_total` (counter): admin identity outcomes
//!
//! Recording is a no-op until a recorder is installed, so library users and
//! tests never need to call [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::GatewayError;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), GatewayError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| GatewayError::Metrics(e.to_string()))?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rate_decision(group: &str, decision: &'static str) {
    metrics::counter!(
        "gateway_rate_limit_decisions_total",
        "group" => group.to_string(),
        "decision" => decision
    )
    .increment(1);
}

pub fn record_maintenance_block(kind: &'static str) {
    metrics::counter!("gateway_maintenance_blocks_total", "kind" => kind).increment(1);
}

pub fn record_admin_check(outcome: &'static str) {
    metrics::counter!("gateway_admin_checks_total", "outcome" => outcome).increment(1);
}
