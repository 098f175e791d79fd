//! # Domain Entities
//!
//! Bindings, registration payloads and the receipts the registrar hands back.

use super::value_objects::{Name, TrustedSender};
use serde::{Deserialize, Serialize};
use shared_types::{Address, DomainId, GasLimit, GatewayId, MessageId};

/// A name bound to its owner in one directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Bound name.
    pub name: Name,
    /// Owner recorded by the first successful write.
    pub owner: Address,
}

/// Decoded content of a registration message.
///
/// The owner is always the address that called `register` on the source
/// domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationPayload {
    /// Requested name.
    pub name: Name,
    /// Registering address.
    pub owner: Address,
}

impl RegistrationPayload {
    /// Convert into the binding it asks for.
    #[must_use]
    pub fn into_binding(self) -> Binding {
        Binding {
            name: self.name,
            owner: self.owner,
        }
    }
}

/// One message handed to the relay during a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchedMessage {
    /// Relay-assigned message id.
    pub message_id: MessageId,
    /// Destination domain.
    pub destination: DomainId,
    /// Receiver on the destination.
    pub receiver: Address,
    /// Gas limit the message was sent with.
    pub gas_limit: GasLimit,
}

/// What a successful `register` call produced.
///
/// Dispatch is not delivery: every message listed here may still be lost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// Registered name.
    pub name: Name,
    /// Owner (the caller).
    pub owner: Address,
    /// Messages handed to the relay, one per destination.
    pub messages: Vec<DispatchedMessage>,
    /// Destinations the relay refused after an earlier one accepted.
    /// Only reachable again through a re-send.
    pub undispatched: Vec<DomainId>,
}

impl RegistrationReceipt {
    /// Destinations that were dispatched to.
    pub fn destinations(&self) -> impl Iterator<Item = DomainId> + '_ {
        self.messages.iter().map(|m| m.destination)
    }

    /// Every destination the registration targets, dispatched or not.
    pub fn targets(&self) -> impl Iterator<Item = DomainId> + '_ {
        self.destinations().chain(self.undispatched.iter().copied())
    }

    /// Whether every targeted destination got a message.
    pub fn is_complete(&self) -> bool {
        self.undispatched.is_empty()
    }
}

/// Result of applying a delivered registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// New binding written.
    Bound(Binding),
    /// Name was already bound. The delivery is consumed without effect.
    AlreadyBound {
        /// Binding that stays in place.
        existing: Binding,
        /// Owner the delivery asked for.
        requested: Address,
    },
}

impl DeliveryOutcome {
    /// Whether this delivery created the binding.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }
}

/// Construction parameters for a [`crate::Receiver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Administrator allowed to edit the allow-list.
    pub admin: Address,
    /// Address this receiver is registered under at the relay.
    pub address: Address,
    /// Domain this receiver lives on.
    pub domain: DomainId,
    /// Gateway whose deliveries are accepted.
    pub gateway: GatewayId,
    /// Initial trusted `(origin, sender)` pair.
    pub trusted_source: TrustedSender,
}
