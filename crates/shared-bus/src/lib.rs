//! # Shared Bus - Simulated Cross-Domain Relay
//!
//! The relay is an external collaborator of the name service. This crate
//! defines the two seams every component talks through and ships an
//! in-memory gateway that honours the relay's contract for tests and the
//! local node.
//!
//! ## Relay Contract
//!
//! - **Send side:** `MessageRouter::send` enqueues and returns a message id.
//!   It never waits for delivery.
//! - **Receive side:** The gateway invokes the `MessageHandler` registered
//!   for `(destination, receiver)` at a time it alone controls.
//! - **At-most-once per send:** A message id is handed to a handler at most
//!   once. It may also never be delivered.
//! - **Authenticated metadata:** Origin domain and sender are stamped by the
//!   endpoint a message was sent through, never read from the payload.
//! - **No ordering:** Back-to-back sends may be delivered in any order.
//!
//! ```text
//! ┌──────────────┐  send()   ┌──────────────────┐  on_message()  ┌──────────────┐
//! │  Registrar   │ ────────→ │  Relay Gateway   │ ─────────────→ │   Receiver   │
//! │ (domain A)   │           │ queue / faults   │                │ (domain B)   │
//! └──────────────┘           └────────┬─────────┘                └──────────────┘
//!                                     │ RelayEvent
//!                                     ▼
//!                              monitoring subscribers
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod gateway;
pub mod router;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, RelayEvent};
pub use gateway::{
    DeliveryReport, DeliveryStatus, FaultPolicy, InMemoryRelayGateway, RelayEndpoint, RelayStats,
};
pub use router::{Delivery, MessageHandler, MessageRouter};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum relay events buffered per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Recent sends a gateway remembers for `replay` and `is_delivered`.
pub const DEFAULT_HISTORY_LIMIT: usize = 4096;
