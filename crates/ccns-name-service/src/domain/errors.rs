//! # Domain Errors
//!
//! Error taxonomy for the name service.

use shared_types::{Address, DomainId, GatewayId, RelayError};
use thiserror::Error;

/// Name service error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameServiceError {
    /// Administrative operation attempted by a non-admin, or a directory
    /// write attempted by someone other than the authorized writer.
    #[error("Unauthorized caller: {caller}")]
    Unauthorized {
        /// Offending caller.
        caller: Address,
    },

    /// No route is configured for a targeted destination.
    #[error("Route not enabled: {0}")]
    RouteNotEnabled(DomainId),

    /// Fan-out registration found no route at all.
    #[error("No destination routes enabled")]
    NoRoutesEnabled,

    /// The name already has a binding.
    #[error("Name already registered: {name} -> {owner}")]
    AlreadyRegistered {
        /// Name that was requested.
        name: String,
        /// Current owner.
        owner: Address,
    },

    /// Delivery metadata does not match any trusted `(domain, sender)` pair.
    #[error("Unauthorized sender {sender} from {origin}")]
    UnauthorizedSender {
        /// Authenticated origin domain.
        origin: DomainId,
        /// Authenticated sender.
        sender: Address,
    },

    /// Delivery did not come from the gateway this receiver is bound to.
    #[error("Invalid router: {0}")]
    InvalidRouter(GatewayId),

    /// Delivery addressed to a different domain or receiver.
    #[error("Misdirected delivery for receiver {receiver} on {domain}")]
    Misdirected {
        /// Destination named by the delivery.
        domain: DomainId,
        /// Receiver named by the delivery.
        receiver: Address,
    },

    /// Name is empty or too long.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// The zero address can neither register nor own a name.
    #[error("Invalid caller: the zero address is reserved")]
    InvalidCaller,

    /// Payload bytes could not be decoded.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The relay refused the hand-off.
    #[error("Dispatch to {domain} failed: {source}")]
    Dispatch {
        /// Destination being dispatched to.
        domain: DomainId,
        /// Relay failure.
        source: RelayError,
    },

    /// Directory backend failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl NameServiceError {
    /// Short stable label, used for metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::RouteNotEnabled(_) => "route_not_enabled",
            Self::NoRoutesEnabled => "no_routes_enabled",
            Self::AlreadyRegistered { .. } => "already_registered",
            Self::UnauthorizedSender { .. } => "unauthorized_sender",
            Self::InvalidRouter(_) => "invalid_router",
            Self::Misdirected { .. } => "misdirected",
            Self::InvalidName(_) => "invalid_name",
            Self::InvalidCaller => "invalid_caller",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Dispatch { .. } => "dispatch",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result type for name service operations.
pub type NameServiceResult<T> = Result<T, NameServiceError>;
