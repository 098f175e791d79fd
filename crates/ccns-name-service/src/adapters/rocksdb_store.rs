//! # RocksDB Directory Store
//!
//! Durable [`DirectoryStore`] for nodes that must keep bindings across
//! restarts.
//!
//! ## Layout
//!
//! - Column family `bindings`: key = UTF-8 name, value = 20-byte owner.
//!
//! Conditional inserts take a process-local write lock around the
//! read-then-put, so one store instance must own the database.

use crate::domain::{Name, NameServiceError, NameServiceResult};
use crate::ports::{DirectoryStore, InsertOutcome};
use parking_lot::Mutex;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteOptions, DB};
use shared_types::Address;
use std::path::PathBuf;

/// Column family holding name bindings.
pub const CF_BINDINGS: &str = "bindings";

/// RocksDB directory configuration.
#[derive(Debug, Clone)]
pub struct RocksDbDirectoryConfig {
    /// Database directory.
    pub path: PathBuf,
    /// fsync every write.
    pub sync_writes: bool,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
}

impl Default for RocksDbDirectoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/directory"),
            sync_writes: true,
            write_buffer_size: 16 * 1024 * 1024,
        }
    }
}

impl RocksDbDirectoryConfig {
    /// Small buffers, no fsync.
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
            write_buffer_size: 1024 * 1024,
        }
    }
}

/// RocksDB-backed directory store.
pub struct RocksDbDirectoryStore {
    db: DB,
    write_lock: Mutex<()>,
    config: RocksDbDirectoryConfig,
}

impl RocksDbDirectoryStore {
    /// Open or create the database.
    ///
    /// # Errors
    ///
    /// `Storage` if RocksDB cannot open the path.
    pub fn open(config: RocksDbDirectoryConfig) -> NameServiceResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
        let descriptors = vec![ColumnFamilyDescriptor::new(CF_BINDINGS, cf_opts)];

        let db = DB::open_cf_descriptors(&opts, &config.path, descriptors)
            .map_err(|e| NameServiceError::Storage(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
            config,
        })
    }

    fn bindings(&self) -> NameServiceResult<&ColumnFamily> {
        self.db
            .cf_handle(CF_BINDINGS)
            .ok_or_else(|| NameServiceError::Storage(format!("missing column family {CF_BINDINGS}")))
    }

    fn read_owner(&self, name: &Name) -> NameServiceResult<Option<Address>> {
        let cf = self.bindings()?;
        let Some(raw) = self
            .db
            .get_cf(cf, name.as_str().as_bytes())
            .map_err(|e| NameServiceError::Storage(format!("RocksDB get failed: {e}")))?
        else {
            return Ok(None);
        };

        let bytes: [u8; 20] = raw.as_slice().try_into().map_err(|_| {
            NameServiceError::Storage(format!(
                "corrupt owner for {name}: {} bytes",
                raw.len()
            ))
        })?;
        Ok(Some(Address::new(bytes)))
    }
}

impl DirectoryStore for RocksDbDirectoryStore {
    fn insert_if_absent(&self, name: &Name, owner: Address) -> NameServiceResult<InsertOutcome> {
        let _guard = self.write_lock.lock();

        if let Some(existing) = self.read_owner(name)? {
            return Ok(InsertOutcome::Occupied(existing));
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .put_cf_opt(self.bindings()?, name.as_str().as_bytes(), owner.as_bytes(), &write_opts)
            .map_err(|e| NameServiceError::Storage(format!("RocksDB put failed: {e}")))?;

        Ok(InsertOutcome::Inserted)
    }

    fn get(&self, name: &Name) -> NameServiceResult<Option<Address>> {
        self.read_owner(name)
    }

    fn len(&self) -> NameServiceResult<usize> {
        let mut count = 0;
        for item in self.db.iterator_cf(self.bindings()?, IteratorMode::Start) {
            item.map_err(|e| NameServiceError::Storage(format!("RocksDB scan failed: {e}")))?;
            count += 1;
        }
        Ok(count)
    }
}

impl std::fmt::Debug for RocksDbDirectoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksDbDirectoryStore")
            .field("path", &self.config.path)
            .finish_non_exhaustive()
    }
}
