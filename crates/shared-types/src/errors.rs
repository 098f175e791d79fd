//! # Error Types
//!
//! Errors shared between the relay and the components that use it.

use crate::entities::{Address, DomainId, MessageId};
use thiserror::Error;

/// Errors parsing a textual address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Wrong number of hex digits.
    #[error("Invalid address length: expected {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Not hexadecimal.
    #[error("Invalid address hex: {0}")]
    InvalidHex(String),
}

/// Errors surfaced by the relay gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The gateway no longer accepts messages.
    #[error("Relay gateway closed")]
    GatewayClosed,

    /// No handler is registered for the destination receiver.
    #[error("No handler for receiver {receiver} on {domain}")]
    Unroutable { domain: DomainId, receiver: Address },

    /// The message id was never sent through this gateway.
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),

    /// The handler rejected the delivery.
    #[error("Delivery rejected by handler: {reason}")]
    Rejected { reason: String },
}
