//! Prometheus metrics.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A failure means a duplicate metric
//! name, which is a programming error surfaced on first use.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Ledger round trips.
/// Labels: kind (submit/read/wait/account), outcome (ok/error)
pub static LEDGER_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "truf_ledger_requests_total",
        "Total ledger requests",
        &["kind", "outcome"]
    )
    .unwrap()
});

/// Ledger round-trip latency in milliseconds.
pub static LEDGER_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "truf_ledger_latency_ms",
        "Ledger request latency in milliseconds",
        &["kind"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
    )
    .unwrap()
});

/// Requests rejected locally before any network call.
pub static VALIDATION_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "truf_validation_rejected_total",
        "Requests rejected by local validation",
        &["operation", "field"]
    )
    .unwrap()
});

/// Attestation poll attempts.
/// Labels: outcome (pending/signed/error/timeout)
pub static ATTESTATION_POLL_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "truf_attestation_poll_attempts_total",
        "Attestation poll attempts",
        &["outcome"]
    )
    .unwrap()
});

/// Signature verifications.
/// Labels: outcome (ok/too_short/invalid)
pub static SIGNATURE_VERIFY_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "truf_signature_verify_total",
        "Attestation signature verifications",
        &["outcome"]
    )
    .unwrap()
});

/// Metrics helper.
pub struct Metrics;

impl Metrics {
    /// Record a completed ledger request.
    pub fn ledger_request(kind: &str, ok: bool, latency_ms: f64) {
        let outcome = if ok { "ok" } else { "error" };
        LEDGER_REQUESTS_TOTAL
            .with_label_values(&[kind, outcome])
            .inc();
        LEDGER_LATENCY_MS
            .with_label_values(&[kind])
            .observe(latency_ms);
    }

    /// Record a local validation rejection.
    pub fn validation_rejected(operation: &str, field: &str) {
        VALIDATION_REJECTED_TOTAL
            .with_label_values(&[operation, field])
            .inc();
    }

    /// Record one poll attempt.
    pub fn poll_attempt(outcome: &str) {
        ATTESTATION_POLL_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Record a signature verification.
    pub fn signature_verified(outcome: &str) {
        SIGNATURE_VERIFY_TOTAL.with_label_values(&[outcome]).inc();
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn gather_text() -> TelemetryResult<String> {
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buf)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
}
