//! # Wiring
//!
//! Background tasks connecting the deployment to the relay.
//!
//! ```text
//!  ┌──────────────┐  send   ┌───────────────────┐ on_message ┌────────────┐
//!  │  Registrar   │───────→ │ InMemoryRelay     │──────────→ │  Receiver  │
//!  │  (source)    │         │ Gateway           │            │ (dest)     │
//!  └──────▲───────┘         └───┬─────────┬─────┘            └────────────┘
//!         │ redispatch          │ run()   │ RelayEvent
//!  ┌──────┴───────┐             ▼         ▼
//!  │  Reconciler  │      delivery loop   relay monitor (logs + gauges)
//!  └──────────────┘
//! ```

pub mod reconciler;
pub mod relay;

pub use reconciler::{ReconcileReport, Reconciler, TrackedRegistration};
pub use relay::{relay_snapshot, spawn_delivery_loop, spawn_relay_monitor};
