//! # Service Layer
//!
//! The four components of the name service. Each is `Send + Sync` and
//! shared behind `Arc` by the hosting runtime.

pub mod directory;
pub mod lookup;
pub mod receiver;
pub mod registrar;

pub use directory::Directory;
pub use lookup::Lookup;
pub use receiver::Receiver;
pub use registrar::Registrar;
