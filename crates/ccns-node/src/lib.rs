//! # CCNS Node
//!
//! Two-domain name service deployment over the simulated relay.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and component wiring
//! - `wiring/` - Relay delivery loop, relay monitor, reconciler
//! - `runtime` - Background task lifecycle and foreground helpers
//!
//! ## Flow
//!
//! ```text
//! alice ─register─→ Registrar(src) ──→ Relay ──→ Receiver(dst) ──→ Directory(dst)
//!                        │                ↑                               │
//!                        ▼                │ redispatch                    ▼
//!                  Directory(src)    Reconciler ←────── resolve ────── Lookup(dst)
//! ```

#![warn(missing_docs)]

pub mod container;
pub mod error;
pub mod runtime;
pub mod wiring;

pub use container::{NameServiceContainer, NodeConfig};
pub use error::{NodeError, NodeResult};
pub use runtime::{NodeRuntime, Resolution};
pub use wiring::{ReconcileReport, Reconciler, TrackedRegistration};
