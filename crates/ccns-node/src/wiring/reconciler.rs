//! # Reconciler
//!
//! Retry layer outside the name service. The relay may lose a registration
//! and the registrar never learns about it; the reconciler compares each
//! dispatched registration with the destination lookup and re-sends through
//! [`Registrar::redispatch`] until it resolves or runs out of attempts.
//!
//! It only reads destination lookups and only writes through the registrar.

use ccns_name_service::{Name, NameResolver, RegistrationReceipt, Registrar};
use parking_lot::Mutex;
use shared_types::{Address, DomainId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// One `(name, destination)` pair awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRegistration {
    /// Registered name.
    pub name: Name,
    /// Owner that registered it.
    pub owner: Address,
    /// Destination it must resolve on.
    pub destination: DomainId,
    /// Re-sends so far.
    pub attempts: u32,
}

impl TrackedRegistration {
    fn matches(&self, name: &Name, destination: DomainId) -> bool {
        self.name == *name && self.destination == destination
    }
}

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Now resolving to their owner.
    pub confirmed: Vec<TrackedRegistration>,
    /// Re-sent during this pass.
    pub redispatched: Vec<TrackedRegistration>,
    /// Given up: attempts exhausted or re-send refused.
    pub abandoned: Vec<TrackedRegistration>,
    /// Bound on the destination to a different owner.
    pub conflicted: Vec<(TrackedRegistration, Address)>,
}

impl ReconcileReport {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty()
            && self.redispatched.is_empty()
            && self.abandoned.is_empty()
            && self.conflicted.is_empty()
    }
}

/// Tracks dispatched registrations and re-sends lost ones.
pub struct Reconciler {
    registrar: Arc<Registrar>,
    resolvers: HashMap<DomainId, Arc<dyn NameResolver>>,
    max_attempts: u32,
    pending: Mutex<Vec<TrackedRegistration>>,
}

impl Reconciler {
    /// Reconciler re-sending through `registrar` at most `max_attempts` times
    /// per `(name, destination)`.
    pub fn new(registrar: Arc<Registrar>, max_attempts: u32) -> Self {
        Self {
            registrar,
            resolvers: HashMap::new(),
            max_attempts,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Resolve names on `domain` through `resolver`.
    #[must_use]
    pub fn with_destination(mut self, domain: DomainId, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolvers.insert(domain, resolver);
        self
    }

    /// Start tracking every destination in `receipt` that has a resolver,
    /// including the ones the relay refused.
    pub fn track(&self, receipt: &RegistrationReceipt) {
        let mut pending = self.pending.lock();
        for destination in receipt.targets() {
            if !self.resolvers.contains_key(&destination) {
                debug!(destination = %destination, "No resolver for destination, not tracked");
                continue;
            }
            if !pending.iter().any(|t| t.matches(&receipt.name, destination)) {
                pending.push(TrackedRegistration {
                    name: receipt.name.clone(),
                    owner: receipt.owner,
                    destination,
                    attempts: 0,
                });
            }
        }
    }

    /// Number of registrations still awaiting confirmation.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Snapshot of the tracked registrations.
    pub fn tracked(&self) -> Vec<TrackedRegistration> {
        self.pending.lock().clone()
    }

    /// Check every tracked registration once.
    pub fn reconcile(&self) -> ReconcileReport {
        let tracked = std::mem::take(&mut *self.pending.lock());
        let mut report = ReconcileReport::default();
        let mut still_pending = Vec::with_capacity(tracked.len());

        for mut entry in tracked {
            let Some(resolver) = self.resolvers.get(&entry.destination) else {
                continue;
            };

            match resolver.resolve(entry.name.as_str()) {
                Some(owner) if owner == entry.owner => {
                    debug!(name = %entry.name, destination = %entry.destination, "Registration confirmed");
                    report.confirmed.push(entry);
                }
                Some(owner) => {
                    warn!(
                        name = %entry.name,
                        destination = %entry.destination,
                        owner = %owner,
                        requested = %entry.owner,
                        "Name bound to another owner on destination"
                    );
                    report.conflicted.push((entry, owner));
                }
                None if entry.attempts >= self.max_attempts => {
                    warn!(
                        name = %entry.name,
                        destination = %entry.destination,
                        attempts = entry.attempts,
                        "Registration abandoned"
                    );
                    report.abandoned.push(entry);
                }
                None => {
                    match self.registrar.redispatch(
                        entry.owner,
                        entry.name.as_str(),
                        entry.destination,
                    ) {
                        Ok(message) => {
                            entry.attempts += 1;
                            info!(
                                name = %entry.name,
                                destination = %entry.destination,
                                attempt = entry.attempts,
                                message_id = %message.message_id,
                                "Registration re-sent"
                            );
                            report.redispatched.push(entry.clone());
                            still_pending.push(entry);
                        }
                        Err(e) => {
                            warn!(
                                name = %entry.name,
                                destination = %entry.destination,
                                error = %e,
                                "Re-send refused, registration abandoned"
                            );
                            report.abandoned.push(entry);
                        }
                    }
                }
            }
        }

        // Entries tracked while this pass ran duplicate ours; ours keep the attempt count.
        let mut pending = self.pending.lock();
        pending.retain(|fresh| {
            !still_pending
                .iter()
                .any(|t| t.matches(&fresh.name, fresh.destination))
        });
        pending.extend(still_pending);
        report
    }

    /// Reconcile on `interval` until `shutdown` flips.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        // The first tick fires immediately; skip it so fresh sends get a delivery window.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.reconcile();
                    if !report.is_empty() {
                        debug!(
                            confirmed = report.confirmed.len(),
                            redispatched = report.redispatched.len(),
                            abandoned = report.abandoned.len(),
                            "Reconcile pass"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Reconciler stopped");
    }
}
