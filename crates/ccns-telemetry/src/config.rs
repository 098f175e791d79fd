//! Telemetry configuration from environment variables.

use std::env;

/// Logging and metrics settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (trace, debug, info, or a full `EnvFilter` string)
    pub log_level: String,

    /// Emit JSON instead of human-readable lines
    pub json_logs: bool,

    /// Write logs to stdout at all
    pub console_output: bool,

    /// Register relay gauges and allow metric export
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ccns-node".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            console_output: true,
            metrics_enabled: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CCNS_SERVICE_NAME`: Service name (default: ccns-node)
    /// - `CCNS_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `CCNS_JSON_LOGS`: JSON logs (default: false, true in containers)
    /// - `CCNS_CONSOLE_OUTPUT`: Console output (default: true)
    /// - `CCNS_METRICS_ENABLED`: Relay gauges and export (default: false)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let defaults = Self::default();

        Self {
            service_name: env::var("CCNS_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: env::var("CCNS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: env::var("CCNS_JSON_LOGS")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(is_container),

            console_output: env::var("CCNS_CONSOLE_OUTPUT")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.console_output),

            metrics_enabled: env::var("CCNS_METRICS_ENABLED")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Same as [`from_env`](Self::from_env) with a fixed service name.
    pub fn for_service(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            ..Self::from_env()
        }
    }
}

/// `true`/`1`/`yes`/`on` and their negations, case-insensitive.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
