//! # In-Memory Relay Gateway
//!
//! A single-process stand-in for the cross-domain transport.
//!
//! Messages are queued on `send` and handed to destination handlers only
//! when the gateway is driven, either explicitly (`deliver_next`,
//! `deliver_all`) or by the `run` loop on a timer. A `FaultPolicy` adds loss
//! and reordering so callers can be tested against the relay's weak
//! guarantees.
//!
//! Only the most recent `history_limit` sends are remembered for `replay`
//! and `is_delivered`; older ids are forgotten in send order.

use crate::events::{EventFilter, RelayEvent};
use crate::router::{Delivery, MessageHandler, MessageRouter};
use crate::subscriber::Subscription;
use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_HISTORY_LIMIT};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use shared_types::{Address, DomainId, GatewayId, MessageId, OutboundMessage, RelayError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Loss and reordering applied at delivery time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaultPolicy {
    /// Probability in `[0, 1]` that a message is lost instead of delivered.
    pub drop_rate: f64,
    /// Deliver queued messages in random order.
    pub shuffle: bool,
}

impl FaultPolicy {
    /// No loss, FIFO delivery.
    #[must_use]
    pub fn reliable() -> Self {
        Self::default()
    }

    /// Lose each message with probability `drop_rate`.
    #[must_use]
    pub fn lossy(drop_rate: f64) -> Self {
        Self {
            drop_rate,
            shuffle: false,
        }
    }

    /// Random delivery order, no loss.
    #[must_use]
    pub fn unordered() -> Self {
        Self {
            drop_rate: 0.0,
            shuffle: true,
        }
    }

    /// Drop rate clamped into a valid probability; NaN counts as zero.
    fn effective_drop_rate(&self) -> f64 {
        if self.drop_rate.is_nan() {
            0.0
        } else {
            self.drop_rate.clamp(0.0, 1.0)
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Handler accepted the message.
    Delivered,
    /// Handler refused the message.
    Rejected { reason: String },
    /// Lost in transit.
    Dropped,
    /// No handler for the destination receiver.
    Unroutable,
}

/// Report for one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Message that was attempted.
    pub message_id: MessageId,
    /// Destination domain.
    pub destination: DomainId,
    /// Destination receiver.
    pub receiver: Address,
    /// What happened.
    pub status: DeliveryStatus,
}

/// Counters snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStats {
    /// Messages accepted by `send`.
    pub sent: u64,
    /// Deliveries accepted by a handler.
    pub delivered: u64,
    /// Deliveries refused by a handler.
    pub rejected: u64,
    /// Messages lost in transit.
    pub dropped: u64,
    /// Messages with no handler.
    pub unroutable: u64,
}

#[derive(Default)]
struct Counters {
    sent: AtomicU64,
    delivered: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
    unroutable: AtomicU64,
}

/// Bounded record of recent sends.
struct History {
    limit: usize,
    /// Retained ids, oldest first.
    order: VecDeque<MessageId>,
    sent: HashMap<MessageId, Delivery>,
    /// Subset of `sent` handed to a handler at least once.
    delivered: HashSet<MessageId>,
}

impl History {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            order: VecDeque::new(),
            sent: HashMap::new(),
            delivered: HashSet::new(),
        }
    }

    fn record(&mut self, delivery: &Delivery) {
        if self.limit == 0 {
            return;
        }
        let message_id = delivery.message_id();
        self.order.push_back(message_id);
        self.sent.insert(message_id, delivery.clone());
        while self.order.len() > self.limit {
            if let Some(evicted) = self.order.pop_front() {
                self.sent.remove(&evicted);
                self.delivered.remove(&evicted);
            }
        }
    }

    fn mark_delivered(&mut self, message_id: MessageId) {
        if self.sent.contains_key(&message_id) {
            self.delivered.insert(message_id);
        }
    }
}

struct GatewayInner {
    id: GatewayId,
    queue: Mutex<VecDeque<Delivery>>,
    history: Mutex<History>,
    handlers: RwLock<HashMap<(DomainId, Address), Arc<dyn MessageHandler>>>,
    events: broadcast::Sender<RelayEvent>,
    policy: RwLock<FaultPolicy>,
    closed: AtomicBool,
    counters: Counters,
    capacity: usize,
}

impl GatewayInner {
    fn emit(&self, event: RelayEvent) {
        // No subscribers is normal.
        let _ = self.events.send(event);
    }

    fn enqueue(
        &self,
        origin: DomainId,
        sender: Address,
        message: OutboundMessage,
    ) -> Result<MessageId, RelayError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RelayError::GatewayClosed);
        }

        let message_id = Uuid::new_v4();
        let delivery = Delivery::new(message_id, self.id, origin, sender, message);
        let event = RelayEvent::Sent {
            message_id,
            origin,
            sender,
            destination: delivery.destination(),
            receiver: delivery.receiver(),
            gas_limit: delivery.gas_limit(),
        };

        self.history.lock().record(&delivery);
        self.queue.lock().push_back(delivery);
        self.counters.sent.fetch_add(1, Ordering::Relaxed);

        debug!(
            message_id = %message_id,
            origin = %origin,
            sender = %sender,
            "Message queued for relay"
        );
        self.emit(event);
        Ok(message_id)
    }
}

/// In-memory relay gateway.
///
/// Cheap to clone; clones share the same queue, handlers and event stream.
#[derive(Clone)]
pub struct InMemoryRelayGateway {
    inner: Arc<GatewayInner>,
}

impl InMemoryRelayGateway {
    /// Create a reliable gateway with default event capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a reliable gateway with the given event capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_limits(capacity, DEFAULT_HISTORY_LIMIT)
    }

    /// Create a reliable gateway with the given event capacity, remembering
    /// at most `history_limit` sends for `replay` and `is_delivered`.
    #[must_use]
    pub fn with_limits(capacity: usize, history_limit: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(GatewayInner {
                id: GatewayId::random(),
                queue: Mutex::new(VecDeque::new()),
                history: Mutex::new(History::new(history_limit)),
                handlers: RwLock::new(HashMap::new()),
                events,
                policy: RwLock::new(FaultPolicy::reliable()),
                closed: AtomicBool::new(false),
                counters: Counters::default(),
                capacity,
            }),
        }
    }

    /// Create a gateway with a fault policy.
    #[must_use]
    pub fn with_policy(policy: FaultPolicy) -> Self {
        let gateway = Self::new();
        gateway.set_policy(policy);
        gateway
    }

    /// Identity stamped on every delivery.
    #[must_use]
    pub fn id(&self) -> GatewayId {
        self.inner.id
    }

    /// Sending endpoint bound to `(origin, sender)`.
    #[must_use]
    pub fn endpoint(&self, origin: DomainId, sender: Address) -> RelayEndpoint {
        RelayEndpoint {
            inner: Arc::clone(&self.inner),
            origin,
            sender,
        }
    }

    /// Register the handler for `receiver` on `domain`, replacing any previous one.
    pub fn register_handler(
        &self,
        domain: DomainId,
        receiver: Address,
        handler: Arc<dyn MessageHandler>,
    ) -> Option<Arc<dyn MessageHandler>> {
        info!(domain = %domain, receiver = %receiver, "Relay handler registered");
        self.inner.handlers.write().insert((domain, receiver), handler)
    }

    /// Remove the handler for `receiver` on `domain`.
    pub fn unregister_handler(
        &self,
        domain: DomainId,
        receiver: Address,
    ) -> Option<Arc<dyn MessageHandler>> {
        self.inner.handlers.write().remove(&(domain, receiver))
    }

    /// Replace the fault policy.
    pub fn set_policy(&self, policy: FaultPolicy) {
        *self.inner.policy.write() = policy;
    }

    /// Current fault policy.
    #[must_use]
    pub fn policy(&self) -> FaultPolicy {
        *self.inner.policy.read()
    }

    /// Refuse further sends. Already queued messages can still be delivered.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);
        info!(gateway = %self.inner.id, "Relay gateway closed");
    }

    /// Whether `send` is refused.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Messages waiting for delivery.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Whether a message has been handed to a handler.
    ///
    /// `false` once the id has aged out of the history.
    #[must_use]
    pub fn is_delivered(&self, message_id: &MessageId) -> bool {
        self.inner.history.lock().delivered.contains(message_id)
    }

    /// Sends currently remembered for `replay`.
    #[must_use]
    pub fn retained(&self) -> usize {
        self.inner.history.lock().order.len()
    }

    /// Counters snapshot.
    #[must_use]
    pub fn stats(&self) -> RelayStats {
        let c = &self.inner.counters;
        RelayStats {
            sent: c.sent.load(Ordering::Relaxed),
            delivered: c.delivered.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            unroutable: c.unroutable.load(Ordering::Relaxed),
        }
    }

    /// Queue an already-sent message again.
    ///
    /// This deliberately breaks at-most-once delivery and exists to exercise
    /// receiver idempotence.
    ///
    /// # Errors
    ///
    /// `RelayError::UnknownMessage` if the id was never sent here or has
    /// aged out of the history.
    pub fn replay(&self, message_id: MessageId) -> Result<(), RelayError> {
        let delivery = self
            .inner
            .history
            .lock()
            .sent
            .get(&message_id)
            .cloned()
            .ok_or(RelayError::UnknownMessage(message_id))?;

        let destination = delivery.destination();
        self.inner.queue.lock().push_back(delivery);
        warn!(message_id = %message_id, "Message replayed into relay queue");
        self.inner.emit(RelayEvent::Replayed {
            message_id,
            destination,
        });
        Ok(())
    }

    /// Attempt delivery of one queued message.
    ///
    /// Returns `None` when the queue is empty.
    pub async fn deliver_next(&self) -> Option<DeliveryReport> {
        let (delivery, lost) = {
            let policy = *self.inner.policy.read();
            let mut queue = self.inner.queue.lock();
            if queue.is_empty() {
                return None;
            }

            let mut rng = rand::thread_rng();
            let index = if policy.shuffle && queue.len() > 1 {
                rng.gen_range(0..queue.len())
            } else {
                0
            };
            let delivery = queue.remove(index)?;
            let drop_rate = policy.effective_drop_rate();
            let lost = drop_rate > 0.0 && rng.gen_bool(drop_rate);
            (delivery, lost)
        };

        let message_id = delivery.message_id();
        let destination = delivery.destination();
        let receiver = delivery.receiver();
        let report = |status| DeliveryReport {
            message_id,
            destination,
            receiver,
            status,
        };

        if lost {
            self.inner.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(message_id = %message_id, destination = %destination, "Message lost in transit");
            self.inner.emit(RelayEvent::Dropped {
                message_id,
                destination,
            });
            return Some(report(DeliveryStatus::Dropped));
        }

        let handler = self
            .inner
            .handlers
            .read()
            .get(&(destination, receiver))
            .cloned();
        let Some(handler) = handler else {
            self.inner.counters.unroutable.fetch_add(1, Ordering::Relaxed);
            warn!(
                message_id = %message_id,
                destination = %destination,
                receiver = %receiver,
                "No handler registered for receiver"
            );
            self.inner.emit(RelayEvent::Unroutable {
                message_id,
                destination,
                receiver,
            });
            return Some(report(DeliveryStatus::Unroutable));
        };

        self.inner.history.lock().mark_delivered(message_id);

        match handler.on_message(delivery).await {
            Ok(()) => {
                self.inner.counters.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(message_id = %message_id, destination = %destination, "Message delivered");
                self.inner.emit(RelayEvent::Delivered {
                    message_id,
                    destination,
                    receiver,
                });
                Some(report(DeliveryStatus::Delivered))
            }
            Err(e) => {
                let reason = match e {
                    RelayError::Rejected { reason } => reason,
                    other => other.to_string(),
                };
                self.inner.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    message_id = %message_id,
                    destination = %destination,
                    reason = %reason,
                    "Delivery rejected by handler"
                );
                self.inner.emit(RelayEvent::Rejected {
                    message_id,
                    destination,
                    receiver,
                    reason: reason.clone(),
                });
                Some(report(DeliveryStatus::Rejected { reason }))
            }
        }
    }

    /// Attempt delivery of everything queued at call time.
    ///
    /// Messages sent by handlers during this pass wait for the next one.
    pub async fn deliver_all(&self) -> Vec<DeliveryReport> {
        let budget = self.pending();
        let mut reports = Vec::with_capacity(budget);
        for _ in 0..budget {
            match self.deliver_next().await {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    /// Deliver on a fixed cadence until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>, interval: Duration) {
        let interval = interval.max(Duration::from_millis(1));
        info!(
            gateway = %self.inner.id,
            interval_ms = interval.as_millis() as u64,
            "Relay delivery loop started"
        );

        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reports = self.deliver_all().await;
                    if !reports.is_empty() {
                        debug!(attempted = reports.len(), "Relay delivery pass");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(gateway = %self.inner.id, "Relay delivery loop stopped");
    }

    /// Subscribe to relay events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.inner.events.subscribe();
        debug!(topics = ?filter.topics, "New relay subscription created");
        Subscription::new(receiver, filter)
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.events.receiver_count()
    }

    /// Event channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Default for InMemoryRelayGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryRelayGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRelayGateway")
            .field("id", &self.inner.id)
            .field("pending", &self.pending())
            .field("retained", &self.retained())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Sending endpoint bound to one `(origin domain, sender)` identity.
#[derive(Clone)]
pub struct RelayEndpoint {
    inner: Arc<GatewayInner>,
    origin: DomainId,
    sender: Address,
}

impl MessageRouter for RelayEndpoint {
    fn send(&self, message: OutboundMessage) -> Result<MessageId, RelayError> {
        self.inner.enqueue(self.origin, self.sender, message)
    }

    fn origin_domain(&self) -> DomainId {
        self.origin
    }

    fn sender(&self) -> Address {
        self.sender
    }
}

impl fmt::Debug for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayEndpoint")
            .field("gateway", &self.inner.id)
            .field("origin", &self.origin)
            .field("sender", &self.sender)
            .finish()
    }
}
