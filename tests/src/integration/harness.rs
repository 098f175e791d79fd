//! # Name Service Test Harness
//!
//! The two-domain deployment used across integration and exploit tests,
//! wired the way a deployment script does it:
//!
//! 1. Lookups on both domains
//! 2. Registrar on the source, Receiver on the destination
//! 3. Lookup writers: source → registrar, destination → receiver
//! 4. Route source → destination enabled with `GAS_LIMIT`

use ccns_name_service::{
    Directory, Lookup, Receiver, ReceiverConfig, Registrar, RegistrarApi, TrustedSender,
};
use shared_bus::{DeliveryReport, DeliveryStatus, FaultPolicy, InMemoryRelayGateway, RelayEndpoint};
use shared_types::{Address, DomainId, GasLimit};
use std::sync::Arc;

/// Source domain selector.
pub const SOURCE: DomainId = DomainId(16_015_286_601_757_825_753);
/// Destination domain selector.
pub const DESTINATION: DomainId = DomainId(14_767_482_510_784_806_043);
/// Route gas limit.
pub const GAS_LIMIT: GasLimit = 10_000_000;

/// Deployer and admin of every component.
pub const ADMIN: Address = Address([0xAD; 20]);
/// Registrar identity on the source domain.
pub const REGISTRAR: Address = Address([0x5E; 20]);
/// Receiver identity on the destination domain.
pub const RECEIVER: Address = Address([0x4E; 20]);
/// Honest user.
pub const ALICE: Address = Address([0xA1; 20]);
/// Second honest user.
pub const BOB: Address = Address([0xB0; 20]);
/// Attacker.
pub const MALLORY: Address = Address([0x66; 20]);

/// Fully wired two-domain deployment.
pub struct NameServiceHarness {
    /// Relay shared by both domains.
    pub gateway: InMemoryRelayGateway,
    /// Source registrar.
    pub registrar: Arc<Registrar>,
    /// Destination receiver.
    pub receiver: Arc<Receiver>,
    /// Source lookup.
    pub source_lookup: Arc<Lookup>,
    /// Destination lookup.
    pub destination_lookup: Arc<Lookup>,
}

impl NameServiceHarness {
    /// Reliable relay; registrar binds locally.
    pub fn new() -> Self {
        Self::build(FaultPolicy::reliable(), true)
    }

    /// Relay with `policy`; registrar binds locally.
    pub fn with_policy(policy: FaultPolicy) -> Self {
        Self::build(policy, true)
    }

    /// Reliable relay; registrar only dispatches, so duplicate names reach
    /// the receiver.
    pub fn dispatch_only() -> Self {
        Self::build(FaultPolicy::reliable(), false)
    }

    fn build(policy: FaultPolicy, local: bool) -> Self {
        let gateway = InMemoryRelayGateway::with_policy(policy);

        let source_directory = Arc::new(Directory::in_memory(SOURCE, ADMIN));
        let destination_directory = Arc::new(Directory::in_memory(DESTINATION, ADMIN));
        let source_lookup = Arc::new(Lookup::new(ADMIN, Arc::clone(&source_directory)));
        let destination_lookup = Arc::new(Lookup::new(ADMIN, Arc::clone(&destination_directory)));

        let mut registrar = Registrar::new(ADMIN, Arc::new(gateway.endpoint(SOURCE, REGISTRAR)));
        if local {
            registrar = registrar.with_local_directory(source_directory);
        }
        let registrar = Arc::new(registrar);

        let receiver = Arc::new(Receiver::new(
            ReceiverConfig {
                admin: ADMIN,
                address: RECEIVER,
                domain: DESTINATION,
                gateway: gateway.id(),
                trusted_source: TrustedSender::new(SOURCE, REGISTRAR),
            },
            destination_directory,
        ));

        source_lookup
            .set_writer(ADMIN, REGISTRAR)
            .expect("admin sets source writer");
        destination_lookup
            .set_writer(ADMIN, RECEIVER)
            .expect("admin sets destination writer");
        registrar
            .enable_route(ADMIN, DESTINATION, RECEIVER, GAS_LIMIT)
            .expect("admin enables route");
        gateway.register_handler(DESTINATION, RECEIVER, receiver.clone());

        Self {
            gateway,
            registrar,
            receiver,
            source_lookup,
            destination_lookup,
        }
    }

    /// Deploy one more destination `domain` with its own receiver at
    /// `receiver` and enable the route to it.
    pub fn add_destination(&self, domain: DomainId, receiver: Address) -> Arc<Lookup> {
        let directory = Arc::new(Directory::in_memory(domain, ADMIN));
        let lookup = Arc::new(Lookup::new(ADMIN, Arc::clone(&directory)));
        let handler = Arc::new(Receiver::new(
            ReceiverConfig {
                admin: ADMIN,
                address: receiver,
                domain,
                gateway: self.gateway.id(),
                trusted_source: TrustedSender::new(SOURCE, REGISTRAR),
            },
            directory,
        ));
        lookup
            .set_writer(ADMIN, receiver)
            .expect("admin sets writer");
        self.registrar
            .enable_route(ADMIN, domain, receiver, GAS_LIMIT)
            .expect("admin enables route");
        self.gateway.register_handler(domain, receiver, handler);
        lookup
    }

    /// A raw sending endpoint with an arbitrary identity.
    pub fn endpoint(&self, origin: DomainId, sender: Address) -> RelayEndpoint {
        self.gateway.endpoint(origin, sender)
    }

    /// Deliver everything queued.
    pub async fn deliver(&self) -> Vec<DeliveryReport> {
        self.gateway.deliver_all().await
    }

    /// Number of bindings on the destination.
    pub fn destination_bindings(&self) -> usize {
        self.destination_lookup
            .directory()
            .len()
            .expect("in-memory store")
    }
}

impl Default for NameServiceHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether every report is `Delivered`.
pub fn all_delivered(reports: &[DeliveryReport]) -> bool {
    reports
        .iter()
        .all(|r| r.status == DeliveryStatus::Delivered)
}

/// Rejection reason of a report, if it was rejected.
pub fn rejection(report: &DeliveryReport) -> Option<&str> {
    match &report.status {
        DeliveryStatus::Rejected { reason } => Some(reason.as_str()),
        _ => None,
    }
}
