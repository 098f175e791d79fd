//! # Outbound Ports
//!
//! Storage behind a directory, plus the relay's send-side seam.

use crate::domain::{Name, NameServiceResult};
use shared_types::Address;

pub use shared_bus::MessageRouter;

/// Result of a conditional insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The binding was written.
    Inserted,
    /// The name was already bound; carries the current owner.
    Occupied(Address),
}

/// Name → owner storage - outbound port.
///
/// `insert_if_absent` must be atomic with respect to concurrent callers:
/// of two racing inserts for one name, exactly one observes `Inserted`.
pub trait DirectoryStore: Send + Sync {
    /// Bind `name` to `owner` unless it is already bound.
    fn insert_if_absent(&self, name: &Name, owner: Address) -> NameServiceResult<InsertOutcome>;

    /// Current owner of `name`.
    fn get(&self, name: &Name) -> NameServiceResult<Option<Address>>;

    /// Number of bindings.
    fn len(&self) -> NameServiceResult<usize>;

    /// Whether the store holds no bindings.
    fn is_empty(&self) -> NameServiceResult<bool> {
        Ok(self.len()? == 0)
    }
}
