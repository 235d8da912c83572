//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_matches_total` (counter): match calls by `outcome` (hit, miss)
//! - `router_match_attempts` (histogram): trie frames visited per match
//! - `router_routes` (gauge): routes in the current table
//! - `router_rebuilds_total` (counter): successful table rebuilds
//! - `router_reload_failures_total` (counter): rejected reloads
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Exporter is Prometheus over HTTP, enabled from config

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and start its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one match call.
pub fn record_match(hit: bool, attempts: usize) {
    let outcome = if hit { "hit" } else { "miss" };
    ::metrics::counter!("router_matches_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("router_match_attempts").record(attempts as f64);
}

/// Record a successful table rebuild.
pub fn record_rebuild(routes: usize) {
    ::metrics::gauge!("router_routes").set(routes as f64);
    ::metrics::counter!("router_rebuilds_total").increment(1);
}

/// Record a reload that was rejected.
pub fn record_reload_failure() {
    ::metrics::counter!("router_reload_failures_total").increment(1);
}
