//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devserve_requests_total` (counter): requests by method, status
//! - `devserve_request_duration_seconds` (histogram): time to response head
//! - `devserve_reload_broadcasts_total` (counter): broadcasts sent
//! - `devserve_reload_failures_total` (counter): per-client delivery failures
//! - `devserve_reload_clients` (gauge): connected reload clients
//!
//! Every recording function is safe to call with no exporter installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Failure is logged, not fatal: serving files does not depend on metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "devserve_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("devserve_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reload_broadcast(delivered: usize, failed: usize) {
    ::metrics::counter!("devserve_reload_broadcasts_total").increment(1);
    if failed > 0 {
        ::metrics::counter!("devserve_reload_failures_total").increment(failed as u64);
    }
    tracing::trace!(delivered, failed, "Recorded reload broadcast");
}

pub fn set_reload_clients(count: usize) {
    ::metrics::gauge!("devserve_reload_clients").set(count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        record_request("GET", 200, Instant::now());
        record_reload_broadcast(2, 1);
        set_reload_clients(3);
    }
}
