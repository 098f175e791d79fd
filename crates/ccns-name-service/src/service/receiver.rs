//! # Receiver
//!
//! Destination-side handler invoked by the relay gateway.
//!
//! ## Acceptance Checks (in order)
//!
//! | # | Check | Error |
//! |---|-------|-------|
//! | 1 | delivering gateway is ours | `InvalidRouter` |
//! | 2 | delivery addressed to this receiver on this domain | `Misdirected` |
//! | 3 | `(origin, sender)` on the allow-list | `UnauthorizedSender` |
//! | 4 | payload decodes | `MalformedPayload` / `InvalidName` |
//! | 5 | directory bind | `AlreadyRegistered` becomes `AlreadyBound` |
//!
//! Origin and sender come from the delivery metadata only. The payload owner
//! is trusted because the allow-listed sender only ever encodes its caller.

use crate::algorithms::decode_registration;
use crate::domain::{
    invariant_admin, invariant_trusted_sender, Binding, DeliveryOutcome, NameServiceError,
    NameServiceResult, ReceiverConfig, TrustedSender,
};
use crate::metrics;
use crate::service::Directory;
use parking_lot::RwLock;
use shared_bus::Delivery;
use shared_types::{Address, DomainId, GatewayId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registration receiver for one destination domain.
pub struct Receiver {
    admin: Address,
    address: Address,
    domain: DomainId,
    gateway: GatewayId,
    trusted: RwLock<HashSet<TrustedSender>>,
    directory: Arc<Directory>,
}

impl Receiver {
    /// Receiver trusting exactly `config.trusted_source`.
    ///
    /// `directory` must list `config.address` as its writer.
    pub fn new(config: ReceiverConfig, directory: Arc<Directory>) -> Self {
        let mut trusted = HashSet::new();
        trusted.insert(config.trusted_source);
        Self {
            admin: config.admin,
            address: config.address,
            domain: config.domain,
            gateway: config.gateway,
            trusted: RwLock::new(trusted),
            directory,
        }
    }

    /// Address the receiver is registered under at the relay.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Domain the receiver lives on.
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Gateway whose deliveries are accepted.
    pub fn gateway(&self) -> GatewayId {
        self.gateway
    }

    /// Directory written by this receiver.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Add a trusted `(origin, sender)` pair. Admin only.
    ///
    /// Returns `false` if the pair was already trusted.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the admin.
    pub fn trust_sender(&self, caller: Address, source: TrustedSender) -> NameServiceResult<bool> {
        invariant_admin(self.admin, caller)?;
        let added = self.trusted.write().insert(source);
        info!(origin = %source.domain, sender = %source.sender, added, "Sender trusted");
        Ok(added)
    }

    /// Remove a trusted pair. Admin only.
    ///
    /// Returns `false` if the pair was not trusted.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the admin.
    pub fn revoke_sender(&self, caller: Address, source: TrustedSender) -> NameServiceResult<bool> {
        invariant_admin(self.admin, caller)?;
        let removed = self.trusted.write().remove(&source);
        info!(origin = %source.domain, sender = %source.sender, removed, "Sender revoked");
        Ok(removed)
    }

    /// Whether `source` is on the allow-list.
    pub fn is_trusted(&self, source: &TrustedSender) -> bool {
        self.trusted.read().contains(source)
    }

    /// Snapshot of the allow-list.
    pub fn trusted_senders(&self) -> Vec<TrustedSender> {
        self.trusted.read().iter().copied().collect()
    }

    /// Apply one delivered registration.
    ///
    /// # Errors
    ///
    /// See the module table. A duplicate name is not an error.
    pub fn handle(&self, delivery: &Delivery) -> NameServiceResult<DeliveryOutcome> {
        self.apply(delivery).inspect_err(|e| {
            metrics::record_delivery_rejected(e.reason());
            warn!(
                message_id = %delivery.message_id(),
                origin = %delivery.origin(),
                sender = %delivery.sender(),
                error = %e,
                "Delivery rejected"
            );
        })
    }

    fn apply(&self, delivery: &Delivery) -> NameServiceResult<DeliveryOutcome> {
        if delivery.gateway() != self.gateway {
            return Err(NameServiceError::InvalidRouter(delivery.gateway()));
        }
        if delivery.destination() != self.domain || delivery.receiver() != self.address {
            return Err(NameServiceError::Misdirected {
                domain: delivery.destination(),
                receiver: delivery.receiver(),
            });
        }
        invariant_trusted_sender(&self.trusted.read(), delivery.origin(), delivery.sender())?;

        let payload = decode_registration(delivery.payload())?;
        let requested = payload.owner;

        match self.directory.bind(self.address, &payload.name, requested) {
            Ok(binding) => {
                debug!(
                    message_id = %delivery.message_id(),
                    name = %binding.name,
                    "Delivery applied"
                );
                Ok(DeliveryOutcome::Bound(binding))
            }
            Err(NameServiceError::AlreadyRegistered { owner, .. }) => {
                metrics::record_duplicate_delivery();
                if owner == requested {
                    debug!(name = %payload.name, owner = %owner, "Duplicate delivery ignored");
                } else {
                    warn!(
                        name = %payload.name,
                        owner = %owner,
                        requested = %requested,
                        "Name already bound to another owner, delivery ignored"
                    );
                }
                Ok(DeliveryOutcome::AlreadyBound {
                    existing: Binding {
                        name: payload.name,
                        owner,
                    },
                    requested,
                })
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for Receiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("address", &self.address)
            .field("domain", &self.domain)
            .field("gateway", &self.gateway)
            .field("trusted", &self.trusted.read().len())
            .finish_non_exhaustive()
    }
}
