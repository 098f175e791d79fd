//! # Algorithms Module
//!
//! Wire encoding of registration messages.

pub mod codec;

pub use codec::{decode_registration, encode_registration, MAX_PAYLOAD_BYTES, PAYLOAD_VERSION};
