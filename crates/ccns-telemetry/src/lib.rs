//! # CCNS Telemetry
//!
//! Logging and metrics bootstrap shared by the node binary and tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ccns_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CCNS_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `CCNS_JSON_LOGS` | `false` | JSON log lines |
//! | `CCNS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CCNS_SERVICE_NAME` | `ccns-node` | Service name in logs |
//! | `CCNS_METRICS_ENABLED` | `false` | Relay gauges and text export |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::init_logging;
pub use metrics::{encode_metrics, observe_relay, RelaySnapshot, RELAY_MESSAGES};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber could not be installed (bad filter, or one already set)
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric encoding failed
    #[error("Failed to export Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging and return a guard to hold for the process lifetime.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    Ok(TelemetryGuard { config })
}

/// Guard that keeps telemetry active. Dropping it logs shutdown.
pub struct TelemetryGuard {
    config: TelemetryConfig,
}

impl TelemetryGuard {
    /// Configuration telemetry was started with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Whether metric export was requested.
    pub fn metrics_enabled(&self) -> bool {
        self.config.metrics_enabled
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.service_name, "Shutting down telemetry");
    }
}
