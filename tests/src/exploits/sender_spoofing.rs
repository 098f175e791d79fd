//! # Sender Spoofing
//!
//! The receiver trusts only relay metadata: the delivering gateway, the
//! destination the message was addressed to, and the `(origin, sender)`
//! pair. Each test forges one of them with an otherwise valid payload.

#[cfg(test)]
mod tests {
    use crate::integration::harness::*;
    use ccns_name_service::{
        encode_registration, Name, Registrar, RegistrarApi, RegistrationPayload, TrustedSender,
    };
    use shared_bus::{InMemoryRelayGateway, MessageRouter};
    use shared_types::{Address, DomainId, OutboundMessage};
    use std::sync::Arc;

    fn payload(name: &str, owner: Address) -> Vec<u8> {
        encode_registration(&RegistrationPayload {
            name: Name::parse(name).unwrap(),
            owner,
        })
        .unwrap()
    }

    fn to_receiver(bytes: Vec<u8>) -> OutboundMessage {
        OutboundMessage::new(DESTINATION, RECEIVER, GAS_LIMIT, bytes)
    }

    #[tokio::test]
    async fn test_unlisted_sender_on_source_rejected() {
        let harness = NameServiceHarness::new();
        let rogue = harness.endpoint(SOURCE, MALLORY);

        rogue.send(to_receiver(payload("alice.ccns", MALLORY))).unwrap();
        let reports = harness.deliver().await;

        let reason = rejection(&reports[0]).expect("rejected");
        assert!(reason.contains("Unauthorized sender"), "{reason}");
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), Address::ZERO);
    }

    #[tokio::test]
    async fn test_trusted_address_on_wrong_origin_rejected() {
        let harness = NameServiceHarness::new();
        // Same address as the registrar, deployed on another domain.
        let lookalike = harness.endpoint(DomainId(7), REGISTRAR);

        lookalike
            .send(to_receiver(payload("alice.ccns", MALLORY)))
            .unwrap();
        let reports = harness.deliver().await;

        assert!(rejection(&reports[0]).is_some());
        assert_eq!(harness.destination_bindings(), 0);
    }

    #[tokio::test]
    async fn test_rogue_registrar_pointed_at_receiver_rejected() {
        let harness = NameServiceHarness::new();
        let rogue = Registrar::new(MALLORY, Arc::new(harness.endpoint(SOURCE, MALLORY)));
        rogue
            .enable_route(MALLORY, DESTINATION, RECEIVER, GAS_LIMIT)
            .unwrap();

        rogue.register(MALLORY, "alice.ccns").unwrap();
        let reports = harness.deliver().await;

        assert!(rejection(&reports[0]).is_some());
        assert_eq!(harness.gateway.stats().rejected, 1);

        // The honest registration still goes through afterwards.
        harness.registrar.register(ALICE, "alice.ccns").unwrap();
        harness.deliver().await;
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), ALICE);
    }

    #[tokio::test]
    async fn test_delivery_from_foreign_gateway_rejected() {
        let harness = NameServiceHarness::new();
        let foreign = InMemoryRelayGateway::new();
        foreign.register_handler(DESTINATION, RECEIVER, harness.receiver.clone());

        // Metadata is perfect; only the gateway is wrong.
        foreign
            .endpoint(SOURCE, REGISTRAR)
            .send(to_receiver(payload("alice.ccns", MALLORY)))
            .unwrap();
        let reports = foreign.deliver_all().await;

        let reason = rejection(&reports[0]).expect("rejected");
        assert!(reason.contains("Invalid router"), "{reason}");
        assert_eq!(harness.destination_bindings(), 0);
    }

    #[tokio::test]
    async fn test_misdirected_delivery_rejected() {
        let harness = NameServiceHarness::new();
        let decoy = Address([0xDE; 20]);
        harness
            .gateway
            .register_handler(DESTINATION, decoy, harness.receiver.clone());

        harness
            .endpoint(SOURCE, REGISTRAR)
            .send(OutboundMessage::new(
                DESTINATION,
                decoy,
                GAS_LIMIT,
                payload("alice.ccns", MALLORY),
            ))
            .unwrap();
        let reports = harness.deliver().await;

        let reason = rejection(&reports[0]).expect("rejected");
        assert!(reason.contains("Misdirected"), "{reason}");
        assert_eq!(harness.destination_bindings(), 0);
    }

    #[tokio::test]
    async fn test_revoked_sender_rejected_until_trusted_again() {
        let harness = NameServiceHarness::new();
        let source = TrustedSender::new(SOURCE, REGISTRAR);
        assert!(harness.receiver.revoke_sender(ADMIN, source).unwrap());

        harness.registrar.register(ALICE, "alice.ccns").unwrap();
        let reports = harness.deliver().await;
        assert!(rejection(&reports[0]).is_some());

        assert!(harness.receiver.trust_sender(ADMIN, source).unwrap());
        harness
            .registrar
            .redispatch(ALICE, "alice.ccns", DESTINATION)
            .unwrap();
        let reports = harness.deliver().await;

        assert!(all_delivered(&reports));
        assert_eq!(harness.destination_lookup.lookup("alice.ccns"), ALICE);
    }

    #[tokio::test]
    async fn test_second_trusted_source_accepted() {
        let harness = NameServiceHarness::new();
        let partner = Address([0x9A; 20]);
        let partner_domain = DomainId(3_478_487_238_524_512_106);
        harness
            .receiver
            .trust_sender(ADMIN, TrustedSender::new(partner_domain, partner))
            .unwrap();

        harness
            .endpoint(partner_domain, partner)
            .send(to_receiver(payload("bob.ccns", BOB)))
            .unwrap();
        let reports = harness.deliver().await;

        assert!(all_delivered(&reports));
        assert_eq!(harness.destination_lookup.lookup("bob.ccns"), BOB);
    }
}
