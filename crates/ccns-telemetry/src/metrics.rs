//! Prometheus export.
//!
//! Everything lives in the default registry, so counters registered by
//! `ccns-name-service` (feature `metrics`) show up next to the relay gauges.

use lazy_static::lazy_static;
use prometheus::{register_int_gauge_vec, Encoder, IntGaugeVec, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Relay message counts by status, copied from gateway snapshots
    pub static ref RELAY_MESSAGES: IntGaugeVec = register_int_gauge_vec!(
        "ccns_relay_messages",
        "Relay message counts by status",
        &["status"]
    )
    .expect("metric creation failed");
}

/// Point-in-time relay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySnapshot {
    /// Accepted by `send`.
    pub sent: u64,
    /// Accepted by a handler.
    pub delivered: u64,
    /// Refused by a handler.
    pub rejected: u64,
    /// Lost in transit.
    pub dropped: u64,
    /// No handler registered.
    pub unroutable: u64,
    /// Still queued.
    pub pending: u64,
}

/// Publish a relay snapshot to the gauges.
pub fn observe_relay(snapshot: RelaySnapshot) {
    let entries = [
        ("sent", snapshot.sent),
        ("delivered", snapshot.delivered),
        ("rejected", snapshot.rejected),
        ("dropped", snapshot.dropped),
        ("unroutable", snapshot.unroutable),
        ("pending", snapshot.pending),
    ];
    for (status, value) in entries {
        RELAY_MESSAGES
            .with_label_values(&[status])
            .set(i64::try_from(value).unwrap_or(i64::MAX));
    }
}

/// Encode every registered metric in Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
