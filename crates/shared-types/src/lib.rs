//! # Shared Types Crate
//!
//! Identity and routing primitives used by every CCNS component, plus the
//! outbound relay envelope.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Address`, `DomainId` and `MessageId` are
//!   defined once here and reused by the registrar, the receiver and the relay.
//! - **Metadata Authority**: The payload of a relayed message never carries
//!   authentication. Origin domain and sender are stamped by the relay and are
//!   the only identity a receiver may trust.
//! - **Reserved Zero Address**: `Address::ZERO` is the "unbound" sentinel and
//!   never identifies an owner.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::OutboundMessage;
pub use errors::*;
