//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_probe_attempts_total` (counter): connect attempts by dependency, result
//! - `gate_dependency_wait_seconds` (histogram): time to ready or timeout
//! - `gate_dependency_ready` (gauge): 1=ready, 0=waiting
//! - `gate_dispatch_total` (counter): dispatched startup modes
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_probe(dependency: &str, result: &'static str) {
    counter!(
        "gate_probe_attempts_total",
        "dependency" => dependency.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_wait(dependency: &str, outcome: &'static str, elapsed: Duration) {
    histogram!(
        "gate_dependency_wait_seconds",
        "dependency" => dependency.to_string(),
        "outcome" => outcome
    )
    .record(elapsed.as_secs_f64());
}

pub fn set_dependency_ready(dependency: &str, ready: bool) {
    gauge!("gate_dependency_ready", "dependency" => dependency.to_string())
        .set(if ready { 1.0 } else { 0.0 });
}

pub fn record_dispatch(mode: &'static str) {
    counter!("gate_dispatch_total", "mode" => mode).increment(1);
}
