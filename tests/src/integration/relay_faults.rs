//! # Relay Faults
//!
//! Loss, reordering, missing handlers and a closed gateway. The registrar is
//! never told about a lost message; recovery goes through the reconciler.

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use ccns_name_service::{NameServiceError, RegistrarApi};
    use ccns_node::Reconciler;
    use shared_bus::{DeliveryStatus, EventFilter, EventTopic, FaultPolicy, RelayEvent};
    use shared_types::{Address, DomainId, RelayError};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lost_message_leaves_destination_unbound() {
        let harness = NameServiceHarness::with_policy(FaultPolicy::lossy(1.0));

        let receipt = harness.registrar.register(ALICE, "alice.ccns").unwrap();
        let reports = harness.deliver().await;

        assert_eq!(reports[0].status, DeliveryStatus::Dropped);
        assert_eq!(harness.gateway.stats().dropped, 1);
        // The source binding stays; only the destination misses out.
        assert_eq!(harness.source_lookup.lookup("alice.ccns"), ALICE);
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), Address::ZERO);
        assert!(!harness.gateway.is_delivered(&receipt.messages[0].message_id));
    }

    #[tokio::test]
    async fn test_reconciler_recovers_lost_registration() {
        let harness = NameServiceHarness::with_policy(FaultPolicy::lossy(1.0));
        let reconciler = Reconciler::new(harness.registrar.clone(), 3)
            .with_destination(DESTINATION, harness.destination_lookup.clone());

        reconciler.track(&harness.registrar.register(ALICE, "alice.ccns").unwrap());
        harness.deliver().await;

        let report = reconciler.reconcile();
        assert_eq!(report.redispatched.len(), 1);

        harness.gateway.set_policy(FaultPolicy::reliable());
        harness.deliver().await;

        let report = reconciler.reconcile();
        assert_eq!(report.confirmed.len(), 1);
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), ALICE);
    }

    #[tokio::test]
    async fn test_redispatch_refused_for_other_owner() {
        let harness = NameServiceHarness::new();
        harness.registrar.register(ALICE, "alice.ccns").unwrap();

        let err = harness
            .registrar
            .redispatch(MALLORY, "alice.ccns", DESTINATION)
            .unwrap_err();
        assert!(matches!(err, NameServiceError::AlreadyRegistered { .. }));
        assert_eq!(harness.gateway.pending(), 1);
    }

    #[tokio::test]
    async fn test_shuffled_delivery_keeps_first_arrival() {
        let harness = NameServiceHarness::dispatch_only();
        harness.gateway.set_policy(FaultPolicy::unordered());

        let alice = harness.registrar.register(ALICE, "race.ccns").unwrap();
        harness.registrar.register(BOB, "race.ccns").unwrap();
        let reports = harness.deliver().await;

        assert!(all_delivered(&reports));
        let expected = if reports[0].message_id == alice.messages[0].message_id {
            ALICE
        } else {
            BOB
        };
        assert_eq!(harness.destination_lookup.lookup("race.ccns"), expected);
        assert_eq!(harness.destination_bindings(), 1);
    }

    #[tokio::test]
    async fn test_shuffled_distinct_names_all_arrive() {
        let harness = NameServiceHarness::with_policy(FaultPolicy::unordered());

        for i in 0..50u8 {
            harness
                .registrar
                .register(Address([i + 1; 20]), &format!("n{i}.ccns"))
                .unwrap();
        }
        let reports = harness.deliver().await;

        assert_eq!(reports.len(), 50);
        assert!(all_delivered(&reports));
        assert_eq!(harness.destination_bindings(), 50);
    }

    #[tokio::test]
    async fn test_route_to_missing_handler_is_unroutable() {
        let harness = NameServiceHarness::new();
        let nowhere = DomainId(42);
        harness
            .registrar
            .enable_route(ADMIN, nowhere, Address([0x77; 20]), GAS_LIMIT)
            .unwrap();

        harness
            .registrar
            .register_to(ALICE, "alice.ccns", &[nowhere])
            .unwrap();
        let reports = harness.deliver().await;

        assert_eq!(reports[0].status, DeliveryStatus::Unroutable);
        assert_eq!(harness.gateway.stats().unroutable, 1);
    }

    #[tokio::test]
    async fn test_closed_gateway_fails_registration() {
        let harness = NameServiceHarness::dispatch_only();
        harness.gateway.close();

        let err = harness.registrar.register(ALICE, "alice.ccns").unwrap_err();
        assert_eq!(
            err,
            NameServiceError::Dispatch {
                domain: DESTINATION,
                source: RelayError::GatewayClosed,
            }
        );
    }

    #[tokio::test]
    async fn test_closed_gateway_leaves_source_unbound() {
        let harness = NameServiceHarness::new();
        harness.gateway.close();

        assert!(harness.registrar.register(ALICE, "alice.ccns").is_err());
        assert_eq!(harness.source_lookup.lookup("alice.ccns"), Address::ZERO);

        // A retry is refused by the relay again, not by a stale local binding.
        assert_eq!(
            harness.registrar.register(ALICE, "alice.ccns").unwrap_err(),
            NameServiceError::Dispatch {
                domain: DESTINATION,
                source: RelayError::GatewayClosed,
            }
        );
    }

    #[tokio::test]
    async fn test_relay_events_follow_message() {
        let harness = NameServiceHarness::new();
        let mut sub = harness.gateway.subscribe(EventFilter::topics(vec![
            EventTopic::Dispatch,
            EventTopic::Delivery,
        ]));

        let receipt = harness.registrar.register(ALICE, "alice.ccns").unwrap();
        harness.deliver().await;

        let events = sub.drain();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RelayEvent::Sent {
                message_id,
                origin,
                sender,
                gas_limit,
                ..
            } => {
                assert_eq!(*message_id, receipt.messages[0].message_id);
                assert_eq!(*origin, SOURCE);
                assert_eq!(*sender, REGISTRAR);
                assert_eq!(*gas_limit, GAS_LIMIT);
            }
            other => panic!("Expected Sent, got {:?}", other),
        }
        assert!(matches!(events[1], RelayEvent::Delivered { .. }));
    }

    #[tokio::test]
    async fn test_background_delivery_loop() {
        let harness = NameServiceHarness::new();
        let (tx, rx) = tokio::sync::watch::channel(false);
        let gateway = harness.gateway.clone();
        let task = tokio::spawn(async move {
            gateway
                .run(rx, std::time::Duration::from_millis(5))
                .await
        });

        harness.registrar.register(ALICE, "alice.ccns").unwrap();
        let mut resolved = false;
        for _ in 0..200 {
            if harness.destination_lookup.lookup("alice.ccns") == ALICE {
                resolved = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        tx.send(true).unwrap();
        task.await.unwrap();
        assert!(resolved);
    }

    #[tokio::test]
    async fn test_shared_reconciler_across_destinations() {
        let harness = NameServiceHarness::with_policy(FaultPolicy::lossy(1.0));
        let third = DomainId(5_009_297_550_715_157_269);
        let third_lookup = harness.add_destination(third, Address([0x4F; 20]));
        let reconciler = Arc::new(
            Reconciler::new(harness.registrar.clone(), 2)
                .with_destination(DESTINATION, harness.destination_lookup.clone())
                .with_destination(third, third_lookup.clone()),
        );

        reconciler.track(&harness.registrar.register(ALICE, "alice.ccns").unwrap());
        assert_eq!(reconciler.pending(), 2);

        harness.deliver().await;
        harness.gateway.set_policy(FaultPolicy::reliable());
        reconciler.reconcile();
        harness.deliver().await;

        let report = reconciler.reconcile();
        assert_eq!(report.confirmed.len(), 2);
        assert_eq!(third_lookup.lookup("alice.ccns"), ALICE);
    }
}
