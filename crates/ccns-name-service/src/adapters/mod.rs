//! # Adapters Module
//!
//! Directory storage backends and the relay-facing receiver handler.

pub mod memory_store;
pub mod relay_handler;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory_store::InMemoryDirectoryStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbDirectoryConfig, RocksDbDirectoryStore};
