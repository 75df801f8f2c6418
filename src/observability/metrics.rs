//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_trust_decisions_total` (counter): decisions by outcome
//! - `edge_trust_refresh_total` (counter): DNS refreshes by trigger and result
//! - `edge_trust_trusted_networks` (gauge): size of the current trusted set

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Needs a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str) {
    counter!("edge_trust_decisions_total", "outcome" => outcome).increment(1);
}

/// A refresh that produced `entries` networks; zero means the lookup failed
/// or returned nothing and trust was revoked.
pub fn record_refresh(trigger: &'static str, entries: usize) {
    let result = if entries == 0 { "empty" } else { "ok" };
    counter!("edge_trust_refresh_total", "trigger" => trigger, "result" => result).increment(1);
    record_trusted_networks(entries);
}

pub fn record_trusted_networks(entries: usize) {
    gauge!("edge_trust_trusted_networks").set(entries as f64);
}
