//! Prometheus metrics for the token service.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oauth2_server_tokens_issued_total",
        "Total number of access tokens issued",
        &["role"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Introspection outcomes: `active` or the rejection reason.
pub static INTROSPECTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oauth2_server_introspections_total",
        "Total number of token introspections by outcome",
        &["outcome"]
    )
    .expect("Failed to register introspections metric")
});

/// JWKS requests counter.
pub static JWKS_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oauth2_server_jwks_requests_total",
        "Total number of JWKS requests",
        &["status"]
    )
    .expect("Failed to register jwks_requests metric")
});

/// Client authentication failures.
pub static AUTH_FAILURES: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "oauth2_server_auth_failures_total",
        "Total number of failed client authentications",
        &["reason"]
    )
    .expect("Failed to register auth_failures metric")
});

/// Record a token issuance.
pub fn record_token_issued(role: &str) {
    TOKENS_ISSUED.with_label_values(&[role]).inc();
}

/// Record an introspection outcome.
pub fn record_introspection(outcome: &str) {
    INTROSPECTIONS.with_label_values(&[outcome]).inc();
}

/// Record a JWKS request.
pub fn record_jwks_request(status: &str) {
    JWKS_REQUESTS.with_label_values(&[status]).inc();
}

/// Record a failed client authentication.
pub fn record_auth_failure(reason: &str) {
    AUTH_FAILURES.with_label_values(&[reason]).inc();
}

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
