//! Metrics collection and exposition.
//!
//! # Metrics
//! - `aggregator_requests_total` (counter): inbound requests by method, status
//! - `aggregator_request_duration_seconds` (histogram): inbound latency
//! - `aggregator_cache_lookups_total` (counter): department cache hits/misses
//! - `aggregator_breaker_calls_total` (counter): guarded calls by outcome
//! - `aggregator_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//! - `aggregator_department_fallbacks_total` (counter): sentinel departments served
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("aggregator_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("aggregator_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("aggregator_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_breaker_call(breaker: &str, outcome: &'static str) {
    counter!(
        "aggregator_breaker_calls_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_breaker_state(breaker: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    gauge!("aggregator_breaker_state", "breaker" => breaker.to_string()).set(value);
}

pub fn record_fallback(reason: &'static str) {
    counter!("aggregator_department_fallbacks_total", "reason" => reason).increment(1);
}
