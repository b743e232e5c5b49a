//! Metrics collection and exposition.
//!
//! # Metrics
//! - `admin_operations_total` (counter): admin calls by operation name
//! - `server_activations_total` (counter): activations by outcome
//! - `active_servers` (gauge): currently active server instances
//!
//! # Design Decisions
//! - Counters are cheap atomic increments recorded at the façade
//! - The Prometheus exporter binds its own listener, enabled by config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics exporter"),
    }
}

/// Count one admin operation.
pub fn record_operation(operation: &'static str) {
    counter!("admin_operations_total", "operation" => operation).increment(1);
}

/// Count one activation attempt by outcome.
pub fn record_activation(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("server_activations_total", "outcome" => outcome).increment(1);
}

/// Track the number of active server instances.
pub fn set_active_servers(count: usize) {
    gauge!("active_servers").set(count as f64);
}
