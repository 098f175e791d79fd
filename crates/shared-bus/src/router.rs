//! # Relay Ports
//!
//! The send primitive used by sending components and the handler callback
//! implemented by receiving components.

use async_trait::async_trait;
use shared_types::{Address, DomainId, GasLimit, GatewayId, MessageId, OutboundMessage, RelayError};

/// Outbound side of the relay.
///
/// Implementations are bound to one `(origin domain, sender)` identity; the
/// caller cannot choose the metadata the destination will see.
pub trait MessageRouter: Send + Sync {
    /// Hand a message to the relay. Returns as soon as it is queued.
    ///
    /// # Errors
    ///
    /// `RelayError::GatewayClosed` if the relay refuses new messages.
    fn send(&self, message: OutboundMessage) -> Result<MessageId, RelayError>;

    /// Domain this router sends from.
    fn origin_domain(&self) -> DomainId;

    /// Sender identity stamped on every message.
    fn sender(&self) -> Address;
}

/// Inbound side of the relay.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Invoked by the gateway once per delivery attempt.
    ///
    /// An `Err` is reported to relay monitoring only. It never travels back
    /// to the original sender and never triggers a retry.
    async fn on_message(&self, delivery: Delivery) -> Result<(), RelayError>;
}

/// A message as presented to the destination handler.
///
/// Only the gateway can build one, so a `Delivery` in hand always carries
/// relay-authenticated metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    message_id: MessageId,
    gateway: GatewayId,
    origin: DomainId,
    sender: Address,
    destination: DomainId,
    receiver: Address,
    gas_limit: GasLimit,
    payload: Vec<u8>,
}

impl Delivery {
    pub(crate) fn new(
        message_id: MessageId,
        gateway: GatewayId,
        origin: DomainId,
        sender: Address,
        message: OutboundMessage,
    ) -> Self {
        Self {
            message_id,
            gateway,
            origin,
            sender,
            destination: message.destination,
            receiver: message.receiver,
            gas_limit: message.gas_limit,
            payload: message.payload,
        }
    }

    /// Relay-assigned message id.
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// Gateway that performed the delivery.
    #[must_use]
    pub fn gateway(&self) -> GatewayId {
        self.gateway
    }

    /// Authenticated origin domain.
    #[must_use]
    pub fn origin(&self) -> DomainId {
        self.origin
    }

    /// Authenticated sender on the origin domain.
    #[must_use]
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Destination domain.
    #[must_use]
    pub fn destination(&self) -> DomainId {
        self.destination
    }

    /// Receiver address on the destination domain.
    #[must_use]
    pub fn receiver(&self) -> Address {
        self.receiver
    }

    /// Execution budget requested by the sender.
    #[must_use]
    pub fn gas_limit(&self) -> GasLimit {
        self.gas_limit
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
