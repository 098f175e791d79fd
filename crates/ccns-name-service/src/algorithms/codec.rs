//! # Registration Payload Codec
//!
//! Layout (bincode, fixed-width little-endian integers):
//!
//! | Field   | Encoding                 |
//! |---------|--------------------------|
//! | version | u16                      |
//! | name    | u64 length + UTF-8 bytes |
//! | owner   | 20 raw bytes             |
//!
//! Only sender and receiver of a route need to agree on this layout.

use crate::domain::{Name, NameServiceError, NameServiceResult, RegistrationPayload};
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Current payload layout version.
pub const PAYLOAD_VERSION: u16 = 1;

/// Largest well-formed payload: version + length prefix + longest name + owner.
pub const MAX_PAYLOAD_BYTES: usize = 2 + 8 + Name::MAX_LEN + Address::LEN;

#[derive(Serialize, Deserialize)]
struct WirePayload {
    version: u16,
    name: String,
    owner: [u8; 20],
}

/// Encode a registration for the relay.
///
/// # Errors
///
/// `MalformedPayload` if bincode fails, which a validated [`Name`] cannot trigger.
pub fn encode_registration(payload: &RegistrationPayload) -> NameServiceResult<Vec<u8>> {
    let wire = WirePayload {
        version: PAYLOAD_VERSION,
        name: payload.name.as_str().to_string(),
        owner: *payload.owner.as_bytes(),
    };
    bincode::serialize(&wire).map_err(|e| NameServiceError::MalformedPayload(e.to_string()))
}

/// Decode and validate a delivered registration.
///
/// # Errors
///
/// `MalformedPayload` on oversize input, bincode failure, trailing bytes,
/// unknown version or zero owner. `InvalidName` if the name is not a valid [`Name`].
pub fn decode_registration(bytes: &[u8]) -> NameServiceResult<RegistrationPayload> {
    if bytes.len() > MAX_PAYLOAD_BYTES {
        return Err(NameServiceError::MalformedPayload(format!(
            "payload is {} bytes, limit is {}",
            bytes.len(),
            MAX_PAYLOAD_BYTES
        )));
    }

    let wire: WirePayload = bincode::deserialize(bytes)
        .map_err(|e| NameServiceError::MalformedPayload(e.to_string()))?;

    let consumed = bincode::serialized_size(&wire)
        .map_err(|e| NameServiceError::MalformedPayload(e.to_string()))?;
    if consumed != bytes.len() as u64 {
        return Err(NameServiceError::MalformedPayload(format!(
            "{} trailing bytes",
            bytes.len() as u64 - consumed.min(bytes.len() as u64)
        )));
    }

    if wire.version != PAYLOAD_VERSION {
        return Err(NameServiceError::MalformedPayload(format!(
            "unsupported payload version {}",
            wire.version
        )));
    }

    let owner = Address::new(wire.owner);
    if owner.is_zero() {
        return Err(NameServiceError::MalformedPayload(
            "owner is the zero address".to_string(),
        ));
    }

    Ok(RegistrationPayload {
        name: Name::parse(wire.name)?,
        owner,
    })
}
