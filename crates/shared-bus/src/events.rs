//! # Relay Events
//!
//! Monitoring events emitted by the gateway. These are the only place a
//! rejected or lost delivery is observable: nothing flows back to the sender.

use serde::{Deserialize, Serialize};
use shared_types::{Address, DomainId, GasLimit, MessageId};

/// Everything the gateway reports about a message's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
    /// A message was accepted for relay.
    Sent {
        message_id: MessageId,
        origin: DomainId,
        sender: Address,
        destination: DomainId,
        receiver: Address,
        gas_limit: GasLimit,
    },

    /// The handler accepted the delivery.
    Delivered {
        message_id: MessageId,
        destination: DomainId,
        receiver: Address,
    },

    /// The handler refused the delivery.
    Rejected {
        message_id: MessageId,
        destination: DomainId,
        receiver: Address,
        reason: String,
    },

    /// The message was lost in transit.
    Dropped {
        message_id: MessageId,
        destination: DomainId,
    },

    /// No handler is registered for the destination receiver.
    Unroutable {
        message_id: MessageId,
        destination: DomainId,
        receiver: Address,
    },

    /// A previously delivered message was queued again (fault injection).
    Replayed {
        message_id: MessageId,
        destination: DomainId,
    },
}

impl RelayEvent {
    /// Topic of this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Sent { .. } | Self::Replayed { .. } => EventTopic::Dispatch,
            Self::Delivered { .. } => EventTopic::Delivery,
            Self::Rejected { .. } | Self::Dropped { .. } | Self::Unroutable { .. } => {
                EventTopic::Failure
            }
        }
    }

    /// Message this event is about.
    #[must_use]
    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Sent { message_id, .. }
            | Self::Delivered { message_id, .. }
            | Self::Rejected { message_id, .. }
            | Self::Dropped { message_id, .. }
            | Self::Unroutable { message_id, .. }
            | Self::Replayed { message_id, .. } => *message_id,
        }
    }

    /// Destination domain of the message.
    #[must_use]
    pub fn destination(&self) -> DomainId {
        match self {
            Self::Sent { destination, .. }
            | Self::Delivered { destination, .. }
            | Self::Rejected { destination, .. }
            | Self::Dropped { destination, .. }
            | Self::Unroutable { destination, .. }
            | Self::Replayed { destination, .. } => *destination,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Accepted sends and replays.
    Dispatch,
    /// Successful deliveries.
    Delivery,
    /// Rejections, drops and unroutable messages.
    Failure,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Destination domains to include. Empty means all destinations.
    pub destinations: Vec<DomainId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            destinations: Vec::new(),
        }
    }

    /// Create a filter for events about specific destination domains.
    #[must_use]
    pub fn for_destinations(destinations: Vec<DomainId>) -> Self {
        Self {
            topics: Vec::new(),
            destinations,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RelayEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let destination_match =
            self.destinations.is_empty() || self.destinations.contains(&event.destination());

        topic_match && destination_match
    }
}
