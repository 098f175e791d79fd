//! Node-level errors.

use crate::container::ConfigError;
use ccns_name_service::NameServiceError;
use thiserror::Error;

/// Failures while building or driving the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A name service operation failed during setup or a request.
    #[error(transparent)]
    NameService(#[from] NameServiceError),

    /// The configured storage backend is not compiled in.
    #[error("Storage backend unavailable: {0}")]
    StorageUnavailable(String),
}

/// Result alias for node operations.
pub type NodeResult<T> = Result<T, NodeError>;
