//! # Directory
//!
//! Per-domain name → owner store. Writes go through a single authorized
//! writer; the first successful write for a name is permanent.

use crate::adapters::InMemoryDirectoryStore;
use crate::domain::{
    invariant_admin, invariant_non_zero_caller, Binding, Name, NameServiceError,
    NameServiceResult,
};
use crate::metrics;
use crate::ports::{DirectoryStore, InsertOutcome, NameResolver};
use parking_lot::RwLock;
use shared_types::{Address, DomainId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name directory for one domain.
pub struct Directory {
    domain: DomainId,
    admin: Address,
    writer: RwLock<Option<Address>>,
    store: Arc<dyn DirectoryStore>,
}

impl Directory {
    /// Directory over `store`. No writer is authorized until `set_writer`.
    pub fn new(domain: DomainId, admin: Address, store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            domain,
            admin,
            writer: RwLock::new(None),
            store,
        }
    }

    /// Directory over a fresh [`InMemoryDirectoryStore`].
    pub fn in_memory(domain: DomainId, admin: Address) -> Self {
        Self::new(domain, admin, Arc::new(InMemoryDirectoryStore::new()))
    }

    /// Domain this directory belongs to.
    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Administrator allowed to change the writer.
    pub fn admin(&self) -> Address {
        self.admin
    }

    /// Currently authorized writer.
    pub fn writer(&self) -> Option<Address> {
        *self.writer.read()
    }

    /// Authorize `writer` as the only address allowed to bind. Admin only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the admin.
    pub fn set_writer(&self, caller: Address, writer: Address) -> NameServiceResult<()> {
        invariant_admin(self.admin, caller)?;
        let previous = self.writer.write().replace(writer);
        info!(
            domain = %self.domain,
            writer = %writer,
            previous = ?previous,
            "Directory writer set"
        );
        Ok(())
    }

    /// Bind `name` to `owner`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if `writer` is not the authorized writer
    /// - `InvalidCaller` if `owner` is the zero address
    /// - `AlreadyRegistered` if the name is bound (to anyone, including `owner`)
    /// - `Storage` on backend failure
    pub fn bind(&self, writer: Address, name: &Name, owner: Address) -> NameServiceResult<Binding> {
        if self.writer() != Some(writer) {
            return Err(NameServiceError::Unauthorized { caller: writer });
        }
        invariant_non_zero_caller(owner)?;

        match self.store.insert_if_absent(name, owner)? {
            InsertOutcome::Inserted => {
                metrics::record_binding_created(self.domain);
                info!(domain = %self.domain, name = %name, owner = %owner, "Name bound");
                Ok(Binding {
                    name: name.clone(),
                    owner,
                })
            }
            InsertOutcome::Occupied(existing) => Err(NameServiceError::AlreadyRegistered {
                name: name.to_string(),
                owner: existing,
            }),
        }
    }

    /// Owner of `name`.
    ///
    /// # Errors
    ///
    /// `Storage` on backend failure.
    pub fn try_resolve(&self, name: &Name) -> NameServiceResult<Option<Address>> {
        self.store.get(name)
    }

    /// Number of bindings.
    ///
    /// # Errors
    ///
    /// `Storage` on backend failure.
    pub fn len(&self) -> NameServiceResult<usize> {
        self.store.len()
    }

    /// Whether no name is bound.
    ///
    /// # Errors
    ///
    /// `Storage` on backend failure.
    pub fn is_empty(&self) -> NameServiceResult<bool> {
        self.store.is_empty()
    }
}

impl NameResolver for Directory {
    /// Never errors: invalid names resolve to `None`, backend failures are
    /// logged and resolve to `None`.
    fn resolve(&self, name: &str) -> Option<Address> {
        let Ok(name) = Name::parse(name) else {
            return None;
        };
        match self.try_resolve(&name) {
            Ok(owner) => {
                debug!(domain = %self.domain, name = %name, found = owner.is_some(), "Resolve");
                owner
            }
            Err(e) => {
                warn!(domain = %self.domain, name = %name, error = %e, "Resolve failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("domain", &self.domain)
            .field("admin", &self.admin)
            .field("writer", &self.writer())
            .finish_non_exhaustive()
    }
}
