//! Node runtime: owns the container and the background loops.
//!
//! ## Startup Sequence
//!
//! 1. Build the container (validates config)
//! 2. Spawn the relay delivery loop
//! 3. Spawn the relay monitor
//! 4. Spawn the reconciler (unless `max_attempts` is 0)

use crate::container::{NameServiceContainer, NodeConfig};
use crate::error::NodeResult;
use crate::wiring::{spawn_delivery_loop, spawn_relay_monitor, ReconcileReport, Reconciler};
use ccns_name_service::{RegistrarApi, RegistrationReceipt};
use parking_lot::Mutex;
use shared_types::{Address, DomainId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Time allowed for background loops to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Lookup results for one name on both domains. Zero means unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Owner on the source domain.
    pub source: Address,
    /// Owner on the destination domain.
    pub destination: Address,
}

/// Running deployment.
pub struct NodeRuntime {
    container: Arc<NameServiceContainer>,
    reconciler: Arc<Reconciler>,
    export_metrics: bool,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Build the deployment. Background loops start with [`start`](Self::start).
    pub fn new(config: NodeConfig, export_metrics: bool) -> NodeResult<Self> {
        info!("Creating CCNS node runtime");
        let container = Arc::new(NameServiceContainer::build(config)?);

        let reconciler = Arc::new(
            Reconciler::new(
                Arc::clone(&container.source.registrar),
                container.config.reconcile.max_attempts,
            )
            .with_destination(
                container.destination.domain,
                container.destination.lookup.clone(),
            ),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container,
            reconciler,
            export_metrics,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the delivery loop, monitor and reconciler.
    pub fn start(&self) {
        let config = &self.container.config;
        let gateway = self.container.gateway.clone();
        let mut tasks = self.tasks.lock();

        tasks.push(spawn_delivery_loop(
            gateway.clone(),
            self.shutdown_rx.clone(),
            Duration::from_millis(config.relay.delivery_interval_ms),
        ));
        tasks.push(spawn_relay_monitor(
            gateway,
            self.shutdown_rx.clone(),
            self.export_metrics,
        ));

        if self.reconcile_enabled() {
            let reconciler = Arc::clone(&self.reconciler);
            let shutdown = self.shutdown_rx.clone();
            let interval = Duration::from_millis(config.reconcile.interval_ms);
            tasks.push(tokio::spawn(reconciler.run(shutdown, interval)));
        }

        info!(
            source = %self.container.source.domain,
            destination = %self.container.destination.domain,
            delivery_interval_ms = config.relay.delivery_interval_ms,
            reconcile = self.reconcile_enabled(),
            "CCNS node running"
        );
    }

    /// Register `name` for `caller` on the source domain and track the
    /// outgoing messages for reconciliation.
    pub fn register(&self, caller: Address, name: &str) -> NodeResult<RegistrationReceipt> {
        let receipt = self.container.source.registrar.register(caller, name)?;
        if self.reconcile_enabled() {
            self.reconciler.track(&receipt);
        }
        Ok(receipt)
    }

    /// Look `name` up on both domains.
    pub fn resolve(&self, name: &str) -> Resolution {
        Resolution {
            source: self.container.source.lookup.lookup(name),
            destination: self.container.destination.lookup.lookup(name),
        }
    }

    /// Deliver and reconcile in the foreground until nothing is pending or
    /// the attempt budget is spent.
    pub async fn settle(&self) -> ReconcileReport {
        let mut total = ReconcileReport::default();
        let rounds = self.container.config.reconcile.max_attempts + 1;

        for _ in 0..=rounds {
            self.container.gateway.deliver_all().await;
            if !self.reconcile_enabled() {
                break;
            }
            let report = self.reconciler.reconcile();
            total.confirmed.extend(report.confirmed);
            total.redispatched.extend(report.redispatched);
            total.abandoned.extend(report.abandoned);
            total.conflicted.extend(report.conflicted);
            if self.reconciler.pending() == 0 {
                break;
            }
        }

        if self.reconciler.pending() > 0 {
            warn!(pending = self.reconciler.pending(), "Settle ended with unconfirmed registrations");
        }
        total
    }

    /// Stop the background loops and wait for them.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Background task failed: {}", e),
                Err(_) => warn!("Background task did not stop in time"),
            }
        }

        info!("Shutdown complete");
    }

    /// The deployment.
    pub fn container(&self) -> Arc<NameServiceContainer> {
        Arc::clone(&self.container)
    }

    /// The reconciler.
    pub fn reconciler(&self) -> Arc<Reconciler> {
        Arc::clone(&self.reconciler)
    }

    /// Source and destination selectors.
    pub fn domains(&self) -> (DomainId, DomainId) {
        (
            self.container.source.domain,
            self.container.destination.domain,
        )
    }

    fn reconcile_enabled(&self) -> bool {
        self.container.config.reconcile.max_attempts > 0
    }
}
