//! # Value Objects
//!
//! Immutable values with validation at construction.

use super::errors::{NameServiceError, NameServiceResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, DomainId, GasLimit};
use std::fmt;
use std::str::FromStr;

/// A registrable name.
///
/// Names are opaque: no normalization, no case folding. `"Alice"` and
/// `"alice"` are distinct keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Longest accepted name, in bytes.
    pub const MAX_LEN: usize = 255;

    /// Validate and wrap a name.
    ///
    /// # Errors
    ///
    /// `InvalidName` when empty or longer than [`Name::MAX_LEN`] bytes.
    pub fn parse(raw: impl Into<String>) -> NameServiceResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(NameServiceError::InvalidName("name is empty".to_string()));
        }
        if raw.len() > Self::MAX_LEN {
            return Err(NameServiceError::InvalidName(format!(
                "name is {} bytes, limit is {}",
                raw.len(),
                Self::MAX_LEN
            )));
        }
        Ok(Self(raw))
    }

    /// Borrow as `&str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

impl FromStr for Name {
    type Err = NameServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = NameServiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A destination the registrar fans out to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledRoute {
    /// Destination domain.
    pub domain: DomainId,
    /// Receiver endpoint on that domain.
    pub receiver: Address,
    /// Execution budget forwarded with every message.
    pub gas_limit: GasLimit,
}

/// A `(origin domain, sender)` pair a receiver accepts deliveries from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrustedSender {
    /// Origin domain as stamped by the relay.
    pub domain: DomainId,
    /// Sending endpoint as stamped by the relay.
    pub sender: Address,
}

impl TrustedSender {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(domain: DomainId, sender: Address) -> Self {
        Self { domain, sender }
    }
}
