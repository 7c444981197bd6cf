//! Metrics definitions for the token authority.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ta_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded: `mode` (2 values), `status` (success, error) and
//! `error_category` (see `ErrorCategory`). Contexts and client names are never
//! used as labels.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Issuance is a file read plus one signature; RSA signing dominates
        .set_buckets_for_metric(
            Matcher::Prefix("ta_token_issuance".to_string()),
            &[
                0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

/// Record a generate request.
///
/// Metric: `ta_token_issuance_total`, `ta_token_issuance_duration_seconds`
/// Labels: `mode`, `status`
pub fn record_token_issuance(mode: &str, status: &str, duration: Duration) {
    histogram!("ta_token_issuance_duration_seconds", "mode" => mode.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("ta_token_issuance_total", "mode" => mode.to_string(), "status" => status.to_string())
        .increment(1);
}

/// Record a token verification outcome.
///
/// Metric: `ta_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("ta_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

/// Record a silent refresh during verification.
///
/// Metric: `ta_token_refresh_total`
pub fn record_token_refresh() {
    counter!("ta_token_refresh_total").increment(1);
}

/// Record a JWK publication request.
///
/// Metric: `ta_jwks_requests_total`
/// Labels: `status`
pub fn record_jwks_request(status: &str) {
    counter!("ta_jwks_requests_total", "status" => status.to_string()).increment(1);
}
