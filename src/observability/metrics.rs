//! Metrics collection and exposition.
//!
//! # Metrics
//! - `symmetry_validations_total` (counter): checks by outcome
//! - `symmetry_policy_fetch_attempts_total` (counter): source lookups by result
//! - `symmetry_self_tests_total` (counter): self-test runs by outcome
//! - `symmetry_currency_fallbacks_total` (counter): unsupported currency lookups
//! - `symmetry_http_request_duration_seconds` (histogram): API latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn outcome(ok: bool, yes: &'static str, no: &'static str) -> &'static str {
    if ok {
        yes
    } else {
        no
    }
}

pub fn record_validation(valid: bool) {
    metrics::counter!("symmetry_validations_total", "outcome" => outcome(valid, "valid", "invalid"))
        .increment(1);
}

pub fn record_policy_fetch(ok: bool) {
    metrics::counter!("symmetry_policy_fetch_attempts_total", "result" => outcome(ok, "ok", "error"))
        .increment(1);
}

pub fn record_self_test(success: bool) {
    metrics::counter!("symmetry_self_tests_total", "outcome" => outcome(success, "pass", "fail"))
        .increment(1);
}

pub fn record_currency_fallback() {
    metrics::counter!("symmetry_currency_fallbacks_total").increment(1);
}

pub fn record_request(endpoint: &'static str, status: u16, start: Instant) {
    metrics::histogram!(
        "symmetry_http_request_duration_seconds",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
