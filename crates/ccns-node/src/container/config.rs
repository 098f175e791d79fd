//! # Node Configuration
//!
//! Loaded from an optional JSON file, then overridden from the environment,
//! then validated.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CCNS_SOURCE_DOMAIN` | `domains.source` |
//! | `CCNS_DESTINATION_DOMAIN` | `domains.destination` |
//! | `CCNS_GAS_LIMIT` | `relay.gas_limit` |
//! | `CCNS_DELIVERY_INTERVAL_MS` | `relay.delivery_interval_ms` |
//! | `CCNS_DROP_RATE` | `relay.drop_rate` |
//! | `CCNS_SHUFFLE` | `relay.shuffle` |
//! | `CCNS_RELAY_HISTORY` | `relay.history_limit` |
//! | `CCNS_RECONCILE_MAX_ATTEMPTS` | `reconcile.max_attempts` |

use serde::{Deserialize, Serialize};
use shared_types::{Address, GasLimit};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default source domain selector.
pub const DEFAULT_SOURCE_DOMAIN: u64 = 16_015_286_601_757_825_753;

/// Default destination domain selector.
pub const DEFAULT_DESTINATION_DOMAIN: u64 = 14_767_482_510_784_806_043;

/// Default gas limit forwarded with each registration.
pub const DEFAULT_GAS_LIMIT: GasLimit = 10_000_000;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Domain selectors.
    pub domains: DomainConfig,
    /// Component identities.
    pub identities: IdentityConfig,
    /// Relay behaviour.
    pub relay: RelayConfig,
    /// Re-send policy for lost registrations.
    pub reconcile: ReconcileConfig,
    /// Directory storage.
    pub storage: StorageConfig,
}

/// Domain selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Domain registrations originate on.
    pub source: u64,
    /// Domain registrations are relayed to.
    pub destination: u64,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_DOMAIN,
            destination: DEFAULT_DESTINATION_DOMAIN,
        }
    }
}

/// Addresses of the deployed components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Administrator of every component.
    #[serde(with = "address_str")]
    pub admin: Address,
    /// Source-domain registrar (trusted sender on the destination).
    #[serde(with = "address_str")]
    pub registrar: Address,
    /// Destination-domain receiver.
    #[serde(with = "address_str")]
    pub receiver: Address,
    /// Destination-domain registrar (no routes).
    #[serde(with = "address_str")]
    pub destination_registrar: Address,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            admin: Address::new([
                0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82,
                0x72, 0x79, 0xcf, 0xff, 0xb9, 0x22, 0x66,
            ]),
            registrar: Address::new([
                0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9,
                0x3f, 0x64, 0x2f, 0x64, 0x18, 0x0a, 0xa3,
            ]),
            receiver: Address::new([
                0xe7, 0xf1, 0x72, 0x5e, 0x77, 0x34, 0xce, 0x28, 0x8f, 0x83, 0x67, 0xe1, 0xbb,
                0x14, 0x3e, 0x90, 0xbb, 0x3f, 0x05, 0x12,
            ]),
            destination_registrar: Address::new([
                0x9f, 0xe4, 0x67, 0x36, 0x67, 0x9d, 0x2d, 0x9a, 0x65, 0xf0, 0x99, 0x2f, 0x22,
                0x72, 0xde, 0x9f, 0x3c, 0x7f, 0xa6, 0xe0,
            ]),
        }
    }
}

/// Relay behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Gas limit of the source → destination route.
    pub gas_limit: GasLimit,
    /// Delivery loop cadence in milliseconds.
    pub delivery_interval_ms: u64,
    /// Probability in `[0, 1]` that a message is lost.
    pub drop_rate: f64,
    /// Deliver queued messages in random order.
    pub shuffle: bool,
    /// Recent sends the gateway remembers for replay.
    pub history_limit: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            delivery_interval_ms: 100,
            drop_rate: 0.0,
            shuffle: false,
            history_limit: shared_bus::DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Reconciliation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Re-sends per `(name, destination)` before giving up. `0` disables.
    pub max_attempts: u32,
    /// Reconcile cadence in milliseconds.
    pub interval_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval_ms: 1_000,
        }
    }
}

/// Directory backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory; bindings vanish on exit.
    #[default]
    Memory,
    /// RocksDB under `data_dir` (needs the `rocksdb` feature).
    RocksDb,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend for both directories.
    pub backend: StorageBackend,
    /// Root directory for durable backends.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`NodeConfig`].
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An override variable could not be parsed.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A domain selector is zero.
    #[error("Domain selector must be non-zero")]
    ZeroDomain,

    /// Source and destination selectors are equal.
    #[error("Source and destination domain are both {0}")]
    IdenticalDomains(u64),

    /// A component identity is the zero address.
    #[error("Identity {0} must not be the zero address")]
    ZeroAddress(&'static str),

    /// Drop rate outside `[0, 1]`.
    #[error("Drop rate {0} outside [0, 1]")]
    InvalidDropRate(f64),

    /// A cadence of zero milliseconds.
    #[error("Interval {0} must be non-zero")]
    ZeroInterval(&'static str),
}

impl NodeConfig {
    /// Load from `path` (if any), apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "CCNS_SOURCE_DOMAIN")? {
            self.domains.source = v;
        }
        if let Some(v) = parse_var(&lookup, "CCNS_DESTINATION_DOMAIN")? {
            self.domains.destination = v;
        }
        if let Some(v) = parse_var(&lookup, "CCNS_GAS_LIMIT")? {
            self.relay.gas_limit = v;
        }
        if let Some(v) = parse_var(&lookup, "CCNS_DELIVERY_INTERVAL_MS")? {
            self.relay.delivery_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "CCNS_DROP_RATE")? {
            self.relay.drop_rate = v;
        }
        if let Some(raw) = lookup("CCNS_SHUFFLE") {
            self.relay.shuffle =
                ccns_telemetry::parse_flag(&raw).ok_or(ConfigError::InvalidEnv {
                    var: "CCNS_SHUFFLE",
                    value: raw,
                })?;
        }
        if let Some(v) = parse_var(&lookup, "CCNS_RELAY_HISTORY")? {
            self.relay.history_limit = v;
        }
        if let Some(v) = parse_var(&lookup, "CCNS_RECONCILE_MAX_ATTEMPTS")? {
            self.reconcile.max_attempts = v;
        }
        Ok(())
    }

    /// Reject configurations the container cannot build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domains.source == 0 || self.domains.destination == 0 {
            return Err(ConfigError::ZeroDomain);
        }
        if self.domains.source == self.domains.destination {
            return Err(ConfigError::IdenticalDomains(self.domains.source));
        }

        let identities = [
            ("admin", self.identities.admin),
            ("registrar", self.identities.registrar),
            ("receiver", self.identities.receiver),
            ("destination_registrar", self.identities.destination_registrar),
        ];
        for (label, address) in identities {
            if address.is_zero() {
                return Err(ConfigError::ZeroAddress(label));
            }
        }

        if !(0.0..=1.0).contains(&self.relay.drop_rate) {
            return Err(ConfigError::InvalidDropRate(self.relay.drop_rate));
        }
        if self.relay.delivery_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("relay.delivery_interval_ms"));
        }
        if self.reconcile.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("reconcile.interval_ms"));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value: raw }),
    }
}

/// Addresses as `0x`-prefixed hex strings in config files.
mod address_str {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use shared_types::Address;

    pub fn serialize<S: Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(address)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(D::Error::custom)
    }
}
