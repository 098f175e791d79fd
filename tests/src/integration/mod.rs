//! # Integration Tests
//!
//! Full registration flow over the in-memory relay.

pub mod e2e_registration;
pub mod harness;
pub mod node_runtime;
pub mod relay_faults;

pub use harness::NameServiceHarness;
