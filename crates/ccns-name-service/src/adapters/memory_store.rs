//! In-memory directory store.

use crate::domain::{Name, NameServiceResult};
use crate::ports::{DirectoryStore, InsertOutcome};
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// `HashMap`-backed [`DirectoryStore`]. Bindings are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    bindings: RwLock<HashMap<Name, Address>>,
}

impl InMemoryDirectoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DirectoryStore for InMemoryDirectoryStore {
    fn insert_if_absent(&self, name: &Name, owner: Address) -> NameServiceResult<InsertOutcome> {
        match self.bindings.write().entry(name.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Occupied(*existing.get())),
            Entry::Vacant(slot) => {
                slot.insert(owner);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    fn get(&self, name: &Name) -> NameServiceResult<Option<Address>> {
        Ok(self.bindings.read().get(name).copied())
    }

    fn len(&self) -> NameServiceResult<usize> {
        Ok(self.bindings.read().len())
    }
}
