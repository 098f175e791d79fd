//! # Inbound Ports
//!
//! What users and administrators can ask of the name service.

use crate::domain::{EnabledRoute, NameServiceResult, RegistrationReceipt};
use shared_types::{Address, DomainId, GasLimit};

/// Registration API on a source domain - inbound port.
///
/// Every call carries the caller identity the hosting domain authenticated.
pub trait RegistrarApi: Send + Sync {
    /// Add or replace the route to `domain`. Admin only.
    fn enable_route(
        &self,
        caller: Address,
        domain: DomainId,
        receiver: Address,
        gas_limit: GasLimit,
    ) -> NameServiceResult<()>;

    /// Remove the route to `domain`. Admin only.
    ///
    /// Returns the removed route, if there was one.
    fn disable_route(
        &self,
        caller: Address,
        domain: DomainId,
    ) -> NameServiceResult<Option<EnabledRoute>>;

    /// Register `name` for `caller` on every enabled destination.
    fn register(&self, caller: Address, name: &str) -> NameServiceResult<RegistrationReceipt>;

    /// Register `name` for `caller` on the listed destinations only.
    ///
    /// Every listed domain must be enabled; otherwise nothing is sent.
    fn register_to(
        &self,
        caller: Address,
        name: &str,
        domains: &[DomainId],
    ) -> NameServiceResult<RegistrationReceipt>;

    /// Snapshot of enabled routes, ordered by domain.
    fn routes(&self) -> Vec<EnabledRoute>;
}

/// Read-only name resolution - inbound port.
pub trait NameResolver: Send + Sync {
    /// Owner of `name`, or `None` when unbound.
    fn resolve(&self, name: &str) -> Option<Address>;
}
