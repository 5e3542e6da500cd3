//! Prometheus metrics for the auth service.
//!
//! Naming: `auth_` prefix, `_total` for counters, `_seconds` for durations.
//!
//! # Cardinality
//!
//! Every label is bounded by code:
//! - `status`: success, error
//! - `error_category`: oversized, malformed, algorithm, signature, expired,
//!   issuer, clock_skew, none
//! - `outcome`: hit, miss, error
//! - `decision`: allow, deny_unauthenticated, deny_forbidden
//! - `path`: the fixed route table, anything else is `/other`

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the global Prometheus recorder and return its handle for `/metrics`.
///
/// # Errors
///
/// Fails if bucket configuration is rejected or a recorder is already
/// installed in this process.
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Login is dominated by one bcrypt verify (cost 10-12).
        .set_buckets_for_metric(
            Matcher::Full("auth_login_duration_seconds".to_string()),
            &[0.050, 0.100, 0.200, 0.300, 0.500, 0.750, 1.000, 2.000],
        )
        .map_err(|e| format!("Failed to set login buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("auth_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Login
// ============================================================================

/// Metric: `auth_login_total`, `auth_login_duration_seconds`
/// Labels: `status`
pub fn record_login(status: &str, duration: Duration) {
    histogram!("auth_login_duration_seconds", "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("auth_login_total", "status" => status.to_string()).increment(1);
}

// ============================================================================
// Token Verification
// ============================================================================

/// Metric: `auth_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &str, error_category: Option<&str>) {
    let category = error_category.unwrap_or("none");
    counter!("auth_token_validations_total", "status" => status.to_string(), "error_category" => category.to_string())
        .increment(1);
}

// ============================================================================
// Sessions and Access
// ============================================================================

/// Metric: `auth_session_lookups_total`
/// Labels: `outcome`
pub fn record_session_lookup(outcome: &str) {
    counter!("auth_session_lookups_total", "outcome" => outcome.to_string()).increment(1);
}

/// Metric: `auth_access_decisions_total`
/// Labels: `decision`
pub fn record_access_decision(decision: &str) {
    counter!("auth_access_decisions_total", "decision" => decision.to_string()).increment(1);
}

// ============================================================================
// HTTP
// ============================================================================

/// Metric: `auth_http_requests_total`, `auth_http_request_duration_seconds`
/// Labels: `method`, `path`, `status_code`
pub fn record_http_request(method: &str, path: &str, status_code: u16, duration: Duration) {
    let normalized_path = normalize_path(path);

    histogram!("auth_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("auth_http_requests_total",
        "method" => method.to_string(),
        "path" => normalized_path,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

fn normalize_path(path: &str) -> &'static str {
    match path {
        "/user/login" => "/user/login",
        "/user/logout" => "/user/logout",
        "/sayHello" => "/sayHello",
        "/admin" => "/admin",
        "/test" => "/test",
        "/health" => "/health",
        "/metrics" => "/metrics",
        _ => "/other",
    }
}
