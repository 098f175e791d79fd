//! # CCNS Name Service
//!
//! First-registration-wins name binding across isolated execution domains.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A name registered on a source domain becomes resolvable on destination
//! domains once the relay delivers the registration:
//!
//! ```text
//! user ─register(name)─→ Registrar ──send──→ Relay ──on_message──→ Receiver
//!                            │                                        │
//!                            ▼ (optional local bind)                  ▼ bind
//!                       Directory(src) ←─ Lookup(src)      Directory(dst) ←─ Lookup(dst)
//! ```
//!
//! ## Security Boundaries
//!
//! | Boundary | Check |
//! |----------|-------|
//! | Admin operations | caller == configured admin |
//! | Registration | owner is always the caller (self-registration) |
//! | Receiver | delivering gateway, destination and `(origin, sender)` allow-list |
//! | Directory | only the authorized writer binds; first write wins |
//!
//! ## Module Structure
//!
//! ```text
//! ccns-name-service/
//! ├── domain/          # Name, routes, bindings, errors, invariants
//! ├── algorithms/      # Wire payload codec
//! ├── ports/           # RegistrarApi, NameResolver, DirectoryStore
//! ├── adapters/        # In-memory / RocksDB stores, relay handler
//! └── service/         # Directory, Registrar, Receiver, Lookup
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryDirectoryStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbDirectoryConfig, RocksDbDirectoryStore};
pub use algorithms::{decode_registration, encode_registration, MAX_PAYLOAD_BYTES, PAYLOAD_VERSION};
pub use domain::{
    Binding, DeliveryOutcome, DispatchedMessage, EnabledRoute, Name, NameServiceError,
    NameServiceResult, ReceiverConfig, RegistrationPayload, RegistrationReceipt, TrustedSender,
};
pub use ports::{DirectoryStore, InsertOutcome, NameResolver, RegistrarApi};
pub use service::{Directory, Lookup, Receiver, Registrar};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
