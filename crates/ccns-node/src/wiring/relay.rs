//! Relay delivery loop and event monitor.

use ccns_telemetry::{observe_relay, RelaySnapshot};
use shared_bus::{EventFilter, InMemoryRelayGateway, RelayEvent};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Drive `gateway` on `interval` until `shutdown` flips.
pub fn spawn_delivery_loop(
    gateway: InMemoryRelayGateway,
    shutdown: watch::Receiver<bool>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        gateway.run(shutdown, interval).await;
    })
}

/// Log every relay event; when `export_metrics` is set, also refresh the
/// relay gauges after each one.
pub fn spawn_relay_monitor(
    gateway: InMemoryRelayGateway,
    mut shutdown: watch::Receiver<bool>,
    export_metrics: bool,
) -> JoinHandle<()> {
    let mut subscription = gateway.subscribe(EventFilter::all());
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = subscription.recv() => {
                    let Some(event) = event else { break };
                    log_event(&event);
                    if export_metrics {
                        observe_relay(relay_snapshot(&gateway));
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Relay monitor stopped");
    })
}

/// Current gateway counters as a telemetry snapshot.
pub fn relay_snapshot(gateway: &InMemoryRelayGateway) -> RelaySnapshot {
    let stats = gateway.stats();
    RelaySnapshot {
        sent: stats.sent,
        delivered: stats.delivered,
        rejected: stats.rejected,
        dropped: stats.dropped,
        unroutable: stats.unroutable,
        pending: gateway.pending() as u64,
    }
}

fn log_event(event: &RelayEvent) {
    match event {
        RelayEvent::Sent {
            message_id,
            origin,
            destination,
            ..
        } => debug!(%message_id, %origin, %destination, "relay: sent"),
        RelayEvent::Delivered {
            message_id,
            destination,
            ..
        } => info!(%message_id, %destination, "relay: delivered"),
        RelayEvent::Rejected {
            message_id,
            destination,
            reason,
            ..
        } => warn!(%message_id, %destination, %reason, "relay: rejected"),
        RelayEvent::Dropped {
            message_id,
            destination,
        } => warn!(%message_id, %destination, "relay: dropped"),
        RelayEvent::Unroutable {
            message_id,
            destination,
            receiver,
        } => warn!(%message_id, %destination, %receiver, "relay: unroutable"),
        RelayEvent::Replayed {
            message_id,
            destination,
        } => warn!(%message_id, %destination, "relay: replayed"),
    }
}
