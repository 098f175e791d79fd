//! # Outbound Relay Envelope
//!
//! What a sending component hands to the relay's `send` primitive.
//!
//! ## Security Properties
//!
//! - **No Identity in the Envelope**: There is no sender or origin field. The
//!   relay endpoint the message is sent through supplies both, so a sender
//!   cannot claim to be someone else.
//! - **Opaque Payload**: The relay never inspects `payload`; the encoding is
//!   owned by the application on both ends.

use crate::entities::{Address, DomainId, GasLimit};
use serde::{Deserialize, Serialize};

/// A message addressed to a receiver on a destination domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Destination execution domain.
    pub destination: DomainId,

    /// Receiver address on the destination domain.
    pub receiver: Address,

    /// Destination-side execution budget (QoS only, not enforced here).
    pub gas_limit: GasLimit,

    /// Application-encoded payload bytes.
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// Current envelope version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Create a new outbound message.
    #[must_use]
    pub fn new(
        destination: DomainId,
        receiver: Address,
        gas_limit: GasLimit,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            destination,
            receiver,
            gas_limit,
            payload,
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}
