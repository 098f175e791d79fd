//! # Lookup
//!
//! Read accessor over the directory of one domain.

use crate::domain::{invariant_admin, NameServiceResult};
use crate::ports::NameResolver;
use crate::service::Directory;
use parking_lot::RwLock;
use shared_types::Address;
use std::sync::Arc;
use tracing::info;

/// Name lookup for one domain.
pub struct Lookup {
    admin: Address,
    directory: RwLock<Arc<Directory>>,
}

impl Lookup {
    /// Lookup reading from `directory`.
    pub fn new(admin: Address, directory: Arc<Directory>) -> Self {
        Self {
            admin,
            directory: RwLock::new(directory),
        }
    }

    /// Directory currently read from.
    pub fn directory(&self) -> Arc<Directory> {
        Arc::clone(&self.directory.read())
    }

    /// Owner of `name`, or [`Address::ZERO`] when unbound.
    pub fn lookup(&self, name: &str) -> Address {
        self.resolve(name).unwrap_or(Address::ZERO)
    }

    /// Point at another directory. Admin only.
    ///
    /// Readers holding the previous directory keep a valid handle.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the admin.
    pub fn repoint(&self, caller: Address, directory: Arc<Directory>) -> NameServiceResult<()> {
        invariant_admin(self.admin, caller)?;
        let domain = directory.domain();
        *self.directory.write() = directory;
        info!(domain = %domain, "Lookup repointed");
        Ok(())
    }

    /// Authorize the writer of the current directory.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` administers the directory.
    pub fn set_writer(&self, caller: Address, writer: Address) -> NameServiceResult<()> {
        self.directory().set_writer(caller, writer)
    }
}

impl NameResolver for Lookup {
    fn resolve(&self, name: &str) -> Option<Address> {
        self.directory.read().resolve(name)
    }
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lookup")
            .field("admin", &self.admin)
            .field("directory", &self.directory.read().domain())
            .finish()
    }
}
