//! # End-to-End Registration
//!
//! `register` on the source, relay delivery, `lookup` on the destination.
//!
//! ```text
//! alice ─register──→ Registrar(src) ─send─→ Relay ─deliver─→ Receiver(dst)
//!                                                                 │
//!                                     Lookup(dst) ←── bind ───────┘
//! ```

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use ccns_name_service::{NameResolver, NameServiceError, RegistrarApi};
    use shared_bus::DeliveryStatus;
    use shared_types::{Address, DomainId};

    #[tokio::test]
    async fn test_registered_name_resolves_on_destination() {
        let harness = NameServiceHarness::new();

        let receipt = harness.registrar.register(ALICE, "alice.ccns").unwrap();
        assert_eq!(receipt.owner, ALICE);
        assert_eq!(receipt.destinations().collect::<Vec<_>>(), vec![DESTINATION]);

        // Nothing on the destination until the relay runs.
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), Address::ZERO);
        assert_eq!(harness.source_lookup.lookup("alice.ccns"), ALICE);

        let reports = harness.deliver().await;
        assert_eq!(reports.len(), 1);
        assert!(all_delivered(&reports));
        assert_eq!(reports[0].message_id, receipt.messages[0].message_id);

        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), ALICE);
    }

    #[tokio::test]
    async fn test_delivery_carries_route_gas_limit() {
        let harness = NameServiceHarness::new();
        let receipt = harness.registrar.register(ALICE, "alice.ccns").unwrap();

        assert_eq!(receipt.messages[0].gas_limit, GAS_LIMIT);
        assert_eq!(receipt.messages[0].receiver, RECEIVER);
    }

    #[tokio::test]
    async fn test_unregistered_name_is_zero_everywhere() {
        let harness = NameServiceHarness::new();
        harness.registrar.register(ALICE, "alice.ccns").unwrap();
        harness.deliver().await;

        assert_eq!(harness.destination_lookup.lookup("bob.ccns"), Address::ZERO);
        assert_eq!(harness.source_lookup.lookup("bob.ccns"), Address::ZERO);
        assert_eq!(harness.destination_lookup.resolve(""), None);
    }

    #[tokio::test]
    async fn test_first_registration_wins_on_destination() {
        let harness = NameServiceHarness::dispatch_only();

        harness.registrar.register(ALICE, "shared.ccns").unwrap();
        harness.registrar.register(BOB, "shared.ccns").unwrap();

        let reports = harness.deliver().await;
        // The duplicate is acknowledged, not rejected.
        assert!(all_delivered(&reports));
        assert_eq!(harness.destination_lookup.lookup("shared.ccns"), ALICE);
        assert_eq!(harness.destination_bindings(), 1);
    }

    #[tokio::test]
    async fn test_local_duplicate_refused_before_dispatch() {
        let harness = NameServiceHarness::new();
        harness.registrar.register(ALICE, "alice.ccns").unwrap();

        let err = harness.registrar.register(BOB, "alice.ccns").unwrap_err();
        assert!(matches!(
            err,
            NameServiceError::AlreadyRegistered { owner, .. } if owner == ALICE
        ));
        assert_eq!(harness.gateway.pending(), 1);
    }

    #[tokio::test]
    async fn test_many_names_many_owners() {
        let harness = NameServiceHarness::dispatch_only();
        let owners: Vec<Address> = (1..=20u8).map(|b| Address([b; 20])).collect();

        for (i, owner) in owners.iter().enumerate() {
            harness
                .registrar
                .register(*owner, &format!("user{i}.ccns"))
                .unwrap();
        }
        let reports = harness.deliver().await;
        assert_eq!(reports.len(), owners.len());
        assert!(all_delivered(&reports));

        for (i, owner) in owners.iter().enumerate() {
            assert_eq!(
                harness.destination_lookup.lookup(&format!("user{i}.ccns")),
                *owner
            );
        }
    }

    #[tokio::test]
    async fn test_fan_out_to_every_enabled_route() {
        let harness = NameServiceHarness::new();
        let third = DomainId(5_009_297_550_715_157_269);
        let third_lookup = harness.add_destination(third, Address([0x4F; 20]));

        let receipt = harness.registrar.register(ALICE, "alice.ccns").unwrap();
        let mut destinations: Vec<DomainId> = receipt.destinations().collect();
        destinations.sort();
        let mut expected = vec![DESTINATION, third];
        expected.sort();
        assert_eq!(destinations, expected);

        harness.deliver().await;
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), ALICE);
        assert_eq!(third_lookup.lookup("alice.ccns"), ALICE);
    }

    #[tokio::test]
    async fn test_register_to_subset_of_routes() {
        let harness = NameServiceHarness::new();
        let third = DomainId(5_009_297_550_715_157_269);
        let third_lookup = harness.add_destination(third, Address([0x4F; 20]));

        let receipt = harness
            .registrar
            .register_to(ALICE, "alice.ccns", &[third])
            .unwrap();
        assert_eq!(receipt.destinations().collect::<Vec<_>>(), vec![third]);

        harness.deliver().await;
        assert_eq!(third_lookup.lookup("alice.ccns"), ALICE);
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), Address::ZERO);
    }

    #[tokio::test]
    async fn test_register_to_unknown_route_sends_nothing() {
        let harness = NameServiceHarness::new();

        let err = harness
            .registrar
            .register_to(ALICE, "alice.ccns", &[DomainId(999)])
            .unwrap_err();
        assert_eq!(err, NameServiceError::RouteNotEnabled(DomainId(999)));
        assert_eq!(harness.gateway.pending(), 0);
        assert_eq!(harness.source_lookup.lookup("alice.ccns"), Address::ZERO);
    }

    #[tokio::test]
    async fn test_disabled_route_stops_propagation() {
        let harness = NameServiceHarness::new();
        let removed = harness
            .registrar
            .disable_route(ADMIN, DESTINATION)
            .unwrap()
            .unwrap();
        assert_eq!(removed.receiver, RECEIVER);

        let err = harness.registrar.register(ALICE, "alice.ccns").unwrap_err();
        assert_eq!(err, NameServiceError::NoRoutesEnabled);
        assert_eq!(harness.gateway.stats().sent, 0);
    }

    #[tokio::test]
    async fn test_replayed_message_is_idempotent() {
        let harness = NameServiceHarness::new();
        let receipt = harness.registrar.register(ALICE, "alice.ccns").unwrap();
        harness.deliver().await;

        harness
            .gateway
            .replay(receipt.messages[0].message_id)
            .unwrap();
        let reports = harness.deliver().await;

        assert_eq!(reports[0].status, DeliveryStatus::Delivered);
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), ALICE);
        assert_eq!(harness.destination_bindings(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_single_winner() {
        let harness = NameServiceHarness::dispatch_only();
        let mut handles = Vec::new();

        for b in 1..=8u8 {
            let registrar = harness.registrar.clone();
            handles.push(tokio::spawn(async move {
                registrar.register(Address([b; 20]), "contested.ccns")
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reports = harness.deliver().await;
        assert_eq!(reports.len(), 8);
        assert!(all_delivered(&reports));
        assert_eq!(harness.destination_bindings(), 1);
        assert_ne!(
            harness.destination_lookup.lookup("contested.ccns"),
            Address::ZERO
        );
    }
}
