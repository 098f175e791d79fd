//! # Domain Invariants
//!
//! Authorization and sender-trust rules shared by the services.

use super::errors::{NameServiceError, NameServiceResult};
use super::value_objects::TrustedSender;
use shared_types::{Address, DomainId};
use std::collections::HashSet;

/// Invariant: only the administrator may run administrative operations.
pub fn invariant_admin(admin: Address, caller: Address) -> NameServiceResult<()> {
    if caller != admin {
        return Err(NameServiceError::Unauthorized { caller });
    }
    Ok(())
}

/// Invariant: the zero address never registers or owns a name.
///
/// `Address::ZERO` is the "not registered" sentinel returned by lookups.
pub fn invariant_non_zero_caller(caller: Address) -> NameServiceResult<()> {
    if caller.is_zero() {
        return Err(NameServiceError::InvalidCaller);
    }
    Ok(())
}

/// Invariant: a delivery is accepted only from a trusted `(origin, sender)`.
pub fn invariant_trusted_sender(
    trusted: &HashSet<TrustedSender>,
    origin: DomainId,
    sender: Address,
) -> NameServiceResult<()> {
    if !trusted.contains(&TrustedSender::new(origin, sender)) {
        return Err(NameServiceError::UnauthorizedSender { origin, sender });
    }
    Ok(())
}
