//! # Node Runtime
//!
//! The assembled node: config file → container → runtime → settle.

#[cfg(test)]
mod tests {
    use ccns_name_service::{NameResolver, RegistrarApi};
    use ccns_node::container::StorageBackend;
    use ccns_node::{NameServiceContainer, NodeConfig, NodeRuntime, Resolution};
    use shared_types::{Address, DomainId};
    use std::io::Write;

    fn alice() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
    }

    fn bob() -> Address {
        "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc".parse().unwrap()
    }

    #[tokio::test]
    async fn test_default_deployment_resolves_alice() {
        let runtime = NodeRuntime::new(NodeConfig::default(), false).unwrap();

        runtime.register(alice(), "alice.ccns").unwrap();
        let report = runtime.settle().await;

        assert_eq!(report.confirmed.len(), 1);
        assert!(report.abandoned.is_empty());
        assert_eq!(
            runtime.resolve("alice.ccns"),
            Resolution {
                source: alice(),
                destination: alice(),
            }
        );
    }

    #[tokio::test]
    async fn test_config_file_drives_deployment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "domains": {{ "source": 11, "destination": 22 }},
                "relay": {{ "gas_limit": 500000 }},
                "reconcile": {{ "max_attempts": 1 }}
            }}"#
        )
        .unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        config.validate().unwrap();
        let container = NameServiceContainer::build(config).unwrap();

        assert_eq!(container.source.domain, DomainId(11));
        assert_eq!(container.destination.domain, DomainId(22));
        let route = container.source.registrar.route(DomainId(22)).unwrap();
        assert_eq!(route.gas_limit, 500_000);
        assert_eq!(route.receiver, container.config.identities.receiver);
    }

    #[tokio::test]
    async fn test_container_components_interoperate() {
        let container = NameServiceContainer::build(NodeConfig::default()).unwrap();

        container
            .source
            .registrar
            .register(bob(), "bob.ccns")
            .unwrap();
        container.gateway.deliver_all().await;

        assert_eq!(container.destination.lookup.resolve("bob.ccns"), Some(bob()));
        assert_eq!(container.source.lookup.resolve("bob.ccns"), Some(bob()));
        assert_eq!(
            container.destination.receiver.directory().writer(),
            Some(container.config.identities.receiver)
        );
    }

    #[tokio::test]
    async fn test_destination_registrar_cannot_register() {
        let container = NameServiceContainer::build(NodeConfig::default()).unwrap();
        assert!(container
            .destination
            .registrar
            .register(alice(), "alice.ccns")
            .is_err());
    }

    #[tokio::test]
    async fn test_lossy_relay_settles_with_reconciler() {
        let mut config = NodeConfig::default();
        config.relay.drop_rate = 0.5;
        config.reconcile.max_attempts = 64;
        let runtime = NodeRuntime::new(config, false).unwrap();

        for (i, byte) in (1..=10u8).enumerate() {
            runtime
                .register(Address([byte; 20]), &format!("user{i}.ccns"))
                .unwrap();
        }
        let report = runtime.settle().await;

        assert_eq!(report.confirmed.len(), 10);
        assert!(report.abandoned.is_empty());
        for (i, byte) in (1..=10u8).enumerate() {
            assert_eq!(
                runtime.resolve(&format!("user{i}.ccns")).destination,
                Address([byte; 20])
            );
        }
    }

    #[tokio::test]
    async fn test_relay_history_stays_bounded() {
        let mut config = NodeConfig::default();
        config.relay.history_limit = 4;
        let runtime = NodeRuntime::new(config, false).unwrap();

        for i in 1..=20u8 {
            runtime
                .register(Address([i; 20]), &format!("user{i}.ccns"))
                .unwrap();
        }
        let report = runtime.settle().await;

        assert_eq!(report.confirmed.len(), 20);
        assert_eq!(runtime.container().gateway.retained(), 4);
        assert_eq!(runtime.resolve("user20.ccns").destination, Address([20; 20]));
    }

    #[tokio::test]
    async fn test_runtime_start_and_shutdown() {
        let mut config = NodeConfig::default();
        config.relay.delivery_interval_ms = 5;
        config.reconcile.interval_ms = 10;
        let runtime = NodeRuntime::new(config, true).unwrap();
        runtime.start();

        runtime.register(alice(), "alice.ccns").unwrap();
        let mut resolved = false;
        for _ in 0..200 {
            if runtime.resolve("alice.ccns").destination == alice() {
                resolved = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        runtime.shutdown().await;

        assert!(resolved);
    }

    #[test]
    fn test_rocksdb_backend_requires_feature() {
        let mut config = NodeConfig::default();
        config.storage.backend = StorageBackend::RocksDb;
        assert!(NodeRuntime::new(config, false).is_err());
    }
}
