//! # Registrar
//!
//! Source-domain entry point. Validates a registration, optionally binds it
//! in the local directory, then hands one message per destination to the
//! relay and returns without waiting for delivery.
//!
//! ## Flow
//!
//! ```text
//! register(caller, name)
//!   1. caller != ZERO
//!   2. Name::parse(name)
//!   3. select routes (all, or the requested subset)
//!   4. encode {version, name, caller}
//!   5. local owner check (if a source directory is attached)
//!   6. router.send(..) per route
//!   7. local bind, once at least one route accepted
//! ```
//!
//! A registration the relay refuses on every route leaves no state behind.
//! Routes refused after an earlier one accepted are listed in
//! [`RegistrationReceipt::undispatched`] for a later re-send.

use crate::algorithms::encode_registration;
use crate::domain::{
    invariant_admin, invariant_non_zero_caller, DispatchedMessage, EnabledRoute, Name,
    NameServiceError, NameServiceResult, RegistrationPayload, RegistrationReceipt,
};
use crate::metrics;
use crate::ports::{MessageRouter, RegistrarApi};
use crate::service::Directory;
use parking_lot::{Mutex, RwLock};
use shared_types::{Address, DomainId, GasLimit, OutboundMessage};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Registration front end for one source domain.
pub struct Registrar {
    admin: Address,
    router: Arc<dyn MessageRouter>,
    routes: RwLock<BTreeMap<DomainId, EnabledRoute>>,
    local: Option<Arc<Directory>>,
    /// Serializes check, dispatch and local bind.
    submit_lock: Mutex<()>,
}

impl Registrar {
    /// Registrar sending through `router`, with no routes enabled.
    pub fn new(admin: Address, router: Arc<dyn MessageRouter>) -> Self {
        Self {
            admin,
            router,
            routes: RwLock::new(BTreeMap::new()),
            local: None,
            submit_lock: Mutex::new(()),
        }
    }

    /// Also bind every registration in `directory`.
    ///
    /// The directory must list this registrar's [`address`](Self::address)
    /// as its writer.
    #[must_use]
    pub fn with_local_directory(mut self, directory: Arc<Directory>) -> Self {
        self.local = Some(directory);
        self
    }

    /// Administrator identity.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Address deliveries from this registrar carry as sender.
    pub fn address(&self) -> Address {
        self.router.sender()
    }

    /// Domain this registrar sends from.
    pub fn domain(&self) -> DomainId {
        self.router.origin_domain()
    }

    /// Attached source-domain directory, if any.
    pub fn local_directory(&self) -> Option<&Arc<Directory>> {
        self.local.as_ref()
    }

    /// Route to `domain`, if enabled.
    pub fn route(&self, domain: DomainId) -> Option<EnabledRoute> {
        self.routes.read().get(&domain).copied()
    }

    /// Re-send an existing registration of `caller` to one destination.
    ///
    /// Used by reconciliation after a message was lost. If a local directory
    /// is attached, the name must be unbound there or bound to `caller`; an
    /// unbound name is bound once the relay accepts the message.
    ///
    /// # Errors
    ///
    /// Same as [`RegistrarApi::register_to`]; `AlreadyRegistered` when the
    /// local binding belongs to someone else.
    pub fn redispatch(
        &self,
        caller: Address,
        name: &str,
        domain: DomainId,
    ) -> NameServiceResult<DispatchedMessage> {
        invariant_non_zero_caller(caller)?;
        let name = Name::parse(name)?;
        let route = self
            .route(domain)
            .ok_or(NameServiceError::RouteNotEnabled(domain))?;
        let payload = Self::encode(&name, caller)?;

        let _guard = self.submit_lock.lock();
        let bound = match &self.local {
            Some(local) => match local.try_resolve(&name)? {
                Some(owner) if owner == caller => true,
                Some(owner) => {
                    return Err(NameServiceError::AlreadyRegistered {
                        name: name.to_string(),
                        owner,
                    })
                }
                None => {
                    self.check_local(&name)?;
                    false
                }
            },
            None => true,
        };

        let message = self.dispatch(&route, payload)?;
        if !bound {
            self.bind_local(&name, caller)?;
        }
        info!(
            name = %name,
            owner = %caller,
            destination = %domain,
            message_id = %message.message_id,
            "Registration re-dispatched"
        );
        Ok(message)
    }

    /// Fail with `AlreadyRegistered` if the local directory has `name`, or
    /// `Unauthorized` if this registrar may not write to it.
    fn check_local(&self, name: &Name) -> NameServiceResult<()> {
        let Some(local) = &self.local else {
            return Ok(());
        };
        if local.writer() != Some(self.address()) {
            return Err(NameServiceError::Unauthorized {
                caller: self.address(),
            });
        }
        match local.try_resolve(name)? {
            Some(owner) => Err(NameServiceError::AlreadyRegistered {
                name: name.to_string(),
                owner,
            }),
            None => Ok(()),
        }
    }

    fn bind_local(&self, name: &Name, owner: Address) -> NameServiceResult<()> {
        match &self.local {
            Some(local) => local.bind(self.address(), name, owner).map(|_| ()),
            None => Ok(()),
        }
    }

    fn encode(name: &Name, owner: Address) -> NameServiceResult<Vec<u8>> {
        encode_registration(&RegistrationPayload {
            name: name.clone(),
            owner,
        })
    }

    fn select_routes(&self, domains: Option<&[DomainId]>) -> NameServiceResult<Vec<EnabledRoute>> {
        let routes = self.routes.read();
        match domains {
            None => {
                if routes.is_empty() {
                    return Err(NameServiceError::NoRoutesEnabled);
                }
                Ok(routes.values().copied().collect())
            }
            Some(domains) => {
                if domains.is_empty() {
                    return Err(NameServiceError::NoRoutesEnabled);
                }
                let mut selected: Vec<EnabledRoute> = Vec::with_capacity(domains.len());
                for domain in domains {
                    let route = routes
                        .get(domain)
                        .ok_or(NameServiceError::RouteNotEnabled(*domain))?;
                    if !selected.iter().any(|r| r.domain == *domain) {
                        selected.push(*route);
                    }
                }
                Ok(selected)
            }
        }
    }

    fn dispatch(&self, route: &EnabledRoute, payload: Vec<u8>) -> NameServiceResult<DispatchedMessage> {
        let message = OutboundMessage::new(route.domain, route.receiver, route.gas_limit, payload);
        let message_id = self.router.send(message).map_err(|source| {
            error!(destination = %route.domain, error = %source, "Relay refused registration");
            NameServiceError::Dispatch {
                domain: route.domain,
                source,
            }
        })?;

        metrics::record_registration_dispatched(route.domain);
        debug!(
            message_id = %message_id,
            destination = %route.domain,
            receiver = %route.receiver,
            gas_limit = route.gas_limit,
            "Registration handed to relay"
        );

        Ok(DispatchedMessage {
            message_id,
            destination: route.domain,
            receiver: route.receiver,
            gas_limit: route.gas_limit,
        })
    }

    fn submit(
        &self,
        caller: Address,
        name: &str,
        domains: Option<&[DomainId]>,
    ) -> NameServiceResult<RegistrationReceipt> {
        invariant_non_zero_caller(caller)?;
        let name = Name::parse(name)?;
        let routes = self.select_routes(domains)?;
        let payload = Self::encode(&name, caller)?;

        let _guard = self.submit_lock.lock();
        self.check_local(&name)?;

        let mut messages = Vec::with_capacity(routes.len());
        let mut undispatched = Vec::new();
        let mut first_error = None;
        for route in &routes {
            match self.dispatch(route, payload.clone()) {
                Ok(message) => messages.push(message),
                Err(e) => {
                    undispatched.push(route.domain);
                    first_error.get_or_insert(e);
                }
            }
        }

        if messages.is_empty() {
            return Err(first_error.unwrap_or(NameServiceError::NoRoutesEnabled));
        }
        self.bind_local(&name, caller)?;

        if undispatched.is_empty() {
            info!(
                name = %name,
                owner = %caller,
                destinations = messages.len(),
                "Registration dispatched"
            );
        } else {
            warn!(
                name = %name,
                owner = %caller,
                destinations = messages.len(),
                undispatched = undispatched.len(),
                "Registration partially dispatched"
            );
        }

        Ok(RegistrationReceipt {
            name,
            owner: caller,
            messages,
            undispatched,
        })
    }
}

impl RegistrarApi for Registrar {
    fn enable_route(
        &self,
        caller: Address,
        domain: DomainId,
        receiver: Address,
        gas_limit: GasLimit,
    ) -> NameServiceResult<()> {
        invariant_admin(self.admin, caller)?;
        let route = EnabledRoute {
            domain,
            receiver,
            gas_limit,
        };
        let previous = self.routes.write().insert(domain, route);
        info!(
            destination = %domain,
            receiver = %receiver,
            gas_limit,
            replaced = previous.is_some(),
            "Route enabled"
        );
        Ok(())
    }

    fn disable_route(
        &self,
        caller: Address,
        domain: DomainId,
    ) -> NameServiceResult<Option<EnabledRoute>> {
        invariant_admin(self.admin, caller)?;
        let removed = self.routes.write().remove(&domain);
        info!(destination = %domain, removed = removed.is_some(), "Route disabled");
        Ok(removed)
    }

    fn register(&self, caller: Address, name: &str) -> NameServiceResult<RegistrationReceipt> {
        self.submit(caller, name, None).inspect_err(|e| {
            metrics::record_registration_failed(e.reason());
        })
    }

    fn register_to(
        &self,
        caller: Address,
        name: &str,
        domains: &[DomainId],
    ) -> NameServiceResult<RegistrationReceipt> {
        self.submit(caller, name, Some(domains)).inspect_err(|e| {
            metrics::record_registration_failed(e.reason());
        })
    }

    fn routes(&self) -> Vec<EnabledRoute> {
        self.routes.read().values().copied().collect()
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("admin", &self.admin)
            .field("domain", &self.domain())
            .field("address", &self.address())
            .field("routes", &self.routes.read().len())
            .field("local", &self.local.is_some())
            .finish()
    }
}
