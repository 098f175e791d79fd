//! # Deployment Container
//!
//! Builds the two-domain deployment and holds every component.
//!
//! ## Build Order
//!
//! ```text
//! 1. Relay gateway (fault policy from config)
//! 2. Directories + Lookups (source, destination)
//! 3. Registrars: source (local writer, route enabled), destination (no routes)
//! 4. Receiver on destination, trusting (source, registrar)
//! 5. Lookup writers: source → registrar, destination → receiver
//! 6. Receiver registered with the gateway
//! ```

pub mod config;

pub use config::{
    ConfigError, DomainConfig, IdentityConfig, NodeConfig, ReconcileConfig, RelayConfig,
    StorageBackend, StorageConfig,
};

use crate::error::{NodeError, NodeResult};
use ccns_name_service::{
    Directory, DirectoryStore, InMemoryDirectoryStore, Lookup, Receiver, ReceiverConfig,
    Registrar, RegistrarApi, TrustedSender,
};
use shared_bus::{FaultPolicy, InMemoryRelayGateway, DEFAULT_CHANNEL_CAPACITY};
use shared_types::DomainId;
use std::sync::Arc;
use tracing::info;

/// Components deployed on the source domain.
pub struct SourceDomain {
    /// Domain selector.
    pub domain: DomainId,
    /// Read access to source bindings.
    pub lookup: Arc<Lookup>,
    /// Registration entry point.
    pub registrar: Arc<Registrar>,
}

/// Components deployed on the destination domain.
pub struct DestinationDomain {
    /// Domain selector.
    pub domain: DomainId,
    /// Read access to relayed bindings.
    pub lookup: Arc<Lookup>,
    /// Registrar with no routes enabled.
    pub registrar: Arc<Registrar>,
    /// Relay handler writing the destination directory.
    pub receiver: Arc<Receiver>,
}

/// Fully wired deployment.
pub struct NameServiceContainer {
    /// Configuration the container was built from.
    pub config: NodeConfig,
    /// Simulated relay shared by both domains.
    pub gateway: InMemoryRelayGateway,
    /// Source-domain components.
    pub source: SourceDomain,
    /// Destination-domain components.
    pub destination: DestinationDomain,
}

impl NameServiceContainer {
    /// Build every component. `config` is validated first.
    pub fn build(config: NodeConfig) -> NodeResult<Self> {
        config.validate()?;

        let ids = config.identities;
        let admin = ids.admin;
        let src = DomainId(config.domains.source);
        let dst = DomainId(config.domains.destination);

        let gateway =
            InMemoryRelayGateway::with_limits(DEFAULT_CHANNEL_CAPACITY, config.relay.history_limit);
        gateway.set_policy(FaultPolicy {
            drop_rate: config.relay.drop_rate,
            shuffle: config.relay.shuffle,
        });

        let src_directory = Arc::new(Directory::new(src, admin, open_store(&config.storage, "source")?));
        let dst_directory = Arc::new(Directory::new(
            dst,
            admin,
            open_store(&config.storage, "destination")?,
        ));
        let src_lookup = Arc::new(Lookup::new(admin, Arc::clone(&src_directory)));
        let dst_lookup = Arc::new(Lookup::new(admin, Arc::clone(&dst_directory)));

        let src_registrar = Arc::new(
            Registrar::new(admin, Arc::new(gateway.endpoint(src, ids.registrar)))
                .with_local_directory(src_directory),
        );
        let dst_registrar = Arc::new(Registrar::new(
            admin,
            Arc::new(gateway.endpoint(dst, ids.destination_registrar)),
        ));

        let receiver = Arc::new(Receiver::new(
            ReceiverConfig {
                admin,
                address: ids.receiver,
                domain: dst,
                gateway: gateway.id(),
                trusted_source: TrustedSender::new(src, ids.registrar),
            },
            dst_directory,
        ));

        src_lookup.set_writer(admin, ids.registrar)?;
        dst_lookup.set_writer(admin, ids.receiver)?;
        src_registrar.enable_route(admin, dst, ids.receiver, config.relay.gas_limit)?;
        gateway.register_handler(dst, ids.receiver, receiver.clone());

        info!(
            source = %src,
            destination = %dst,
            gateway = %gateway.id(),
            gas_limit = config.relay.gas_limit,
            "Name service deployment ready"
        );

        Ok(Self {
            config,
            gateway,
            source: SourceDomain {
                domain: src,
                lookup: src_lookup,
                registrar: src_registrar,
            },
            destination: DestinationDomain {
                domain: dst,
                lookup: dst_lookup,
                registrar: dst_registrar,
                receiver,
            },
        })
    }
}

#[cfg(feature = "rocksdb")]
fn open_store(storage: &StorageConfig, label: &str) -> NodeResult<Arc<dyn DirectoryStore>> {
    use ccns_name_service::{RocksDbDirectoryConfig, RocksDbDirectoryStore};

    match storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryDirectoryStore::new())),
        StorageBackend::RocksDb => {
            let config = RocksDbDirectoryConfig {
                path: storage.data_dir.join(label),
                ..RocksDbDirectoryConfig::default()
            };
            Ok(Arc::new(RocksDbDirectoryStore::open(config)?))
        }
    }
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(storage: &StorageConfig, label: &str) -> NodeResult<Arc<dyn DirectoryStore>> {
    match storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryDirectoryStore::new())),
        StorageBackend::RocksDb => Err(NodeError::StorageUnavailable(format!(
            "{label} directory wants rocksdb; rebuild with --features rocksdb"
        ))),
    }
}
