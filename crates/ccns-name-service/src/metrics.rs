//! # Name Service Metrics
//!
//! Prometheus counters for registrations and deliveries.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! ccns-name-service = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `ccns_registrations_dispatched_total` - Messages handed to the relay (by destination)
//! - `ccns_registration_failures_total` - Failed `register` calls (by reason)
//! - `ccns_bindings_created_total` - Bindings written (by domain)
//! - `ccns_duplicate_deliveries_total` - Deliveries for an already-bound name
//! - `ccns_deliveries_rejected_total` - Deliveries refused by a receiver (by reason)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

use shared_types::DomainId;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Registration messages handed to the relay, labeled by destination
    pub static ref REGISTRATIONS_DISPATCHED: IntCounterVec = register_int_counter_vec!(
        "ccns_registrations_dispatched_total",
        "Total registration messages handed to the relay",
        &["destination"]
    )
    .expect("Failed to create REGISTRATIONS_DISPATCHED metric");

    /// Failed register calls, labeled by reason
    pub static ref REGISTRATION_FAILURES: IntCounterVec = register_int_counter_vec!(
        "ccns_registration_failures_total",
        "Total register calls that returned an error",
        &["reason"]
    )
    .expect("Failed to create REGISTRATION_FAILURES metric");

    /// Bindings written, labeled by domain
    pub static ref BINDINGS_CREATED: IntCounterVec = register_int_counter_vec!(
        "ccns_bindings_created_total",
        "Total name bindings written",
        &["domain"]
    )
    .expect("Failed to create BINDINGS_CREATED metric");

    /// Deliveries for names that were already bound
    pub static ref DUPLICATE_DELIVERIES: IntCounter = register_int_counter!(
        "ccns_duplicate_deliveries_total",
        "Total deliveries consumed without effect because the name was bound"
    )
    .expect("Failed to create DUPLICATE_DELIVERIES metric");

    /// Deliveries refused by a receiver, labeled by reason
    pub static ref DELIVERIES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "ccns_deliveries_rejected_total",
        "Total deliveries refused by a receiver",
        &["reason"]
    )
    .expect("Failed to create DELIVERIES_REJECTED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a registration message handed to the relay
#[cfg(feature = "metrics")]
pub fn record_registration_dispatched(destination: DomainId) {
    REGISTRATIONS_DISPATCHED
        .with_label_values(&[&destination.get().to_string()])
        .inc();
}

/// Record a failed register call
#[cfg(feature = "metrics")]
pub fn record_registration_failed(reason: &str) {
    REGISTRATION_FAILURES.with_label_values(&[reason]).inc();
}

/// Record a binding written on `domain`
#[cfg(feature = "metrics")]
pub fn record_binding_created(domain: DomainId) {
    BINDINGS_CREATED
        .with_label_values(&[&domain.get().to_string()])
        .inc();
}

/// Record a delivery for an already-bound name
#[cfg(feature = "metrics")]
pub fn record_duplicate_delivery() {
    DUPLICATE_DELIVERIES.inc();
}

/// Record a delivery refused by a receiver
#[cfg(feature = "metrics")]
pub fn record_delivery_rejected(reason: &str) {
    DELIVERIES_REJECTED.with_label_values(&[reason]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_registration_dispatched(_destination: DomainId) {}

#[cfg(not(feature = "metrics"))]
pub fn record_registration_failed(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_binding_created(_domain: DomainId) {}

#[cfg(not(feature = "metrics"))]
pub fn record_duplicate_delivery() {}

#[cfg(not(feature = "metrics"))]
pub fn record_delivery_rejected(_reason: &str) {}
