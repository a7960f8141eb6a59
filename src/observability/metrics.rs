//! Metrics collection and exposition.
//!
//! # Metrics
//! - `content_fetch_total` (counter): fetch outcomes by `outcome`
//! - `content_fetch_duration_seconds` (histogram): source round trips by `kind`
//! - `content_gate_queued` (gauge): admission slots currently held
//! - `content_cache_entries` (gauge): stored cache entries
//! - `http_requests_total` (counter): API requests by `route`, `status`
//!
//! All recorders are no-ops until [`init_metrics`] installs an exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_fetch_outcome(outcome: &'static str) {
    counter!("content_fetch_total", "outcome" => outcome).increment(1);
}

pub fn record_fetch_duration(kind: &'static str, start: Instant) {
    histogram!("content_fetch_duration_seconds", "kind" => kind)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_gate_depth(queued: usize) {
    gauge!("content_gate_queued").set(queued as f64);
}

pub fn record_cache_size(entries: usize) {
    gauge!("content_cache_entries").set(entries as f64);
}

pub fn record_request(route: &'static str, status: u16) {
    counter!("http_requests_total", "route" => route, "status" => status.to_string())
        .increment(1);
}
