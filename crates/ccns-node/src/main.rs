//! # CCNS Node
//!
//! Runs the two-domain name service deployment.
//!
//! ```text
//! ccns-node                               # run until Ctrl+C
//! ccns-node --config node.json            # file config, env overrides on top
//! ccns-node --register alice.ccns --once  # register, settle, print, exit
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use ccns_node::{NodeConfig, NodeRuntime};
use ccns_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};
use clap::Parser;
use shared_types::Address;
use tracing::{info, warn};

/// Cross-domain name service node
#[derive(Parser, Debug)]
#[command(name = "ccns-node", about = "Cross-domain name service node")]
struct Args {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name to register at startup (repeatable)
    #[arg(short, long = "register")]
    register: Vec<String>,

    /// Address registering the startup names
    #[arg(long, default_value = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8")]
    caller: Address,

    /// Settle in the foreground, print resolutions and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = init_telemetry(TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = NodeConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let runtime = NodeRuntime::new(config, telemetry.metrics_enabled())
        .context("Failed to build deployment")?;

    for name in &args.register {
        match runtime.register(args.caller, name) {
            Ok(receipt) => info!(
                name = %receipt.name,
                owner = %receipt.owner,
                messages = receipt.messages.len(),
                undispatched = receipt.undispatched.len(),
                "Registration dispatched"
            ),
            Err(e) => warn!(name = %name, error = %e, "Registration failed"),
        }
    }

    if args.once {
        let report = runtime.settle().await;
        for name in &args.register {
            let resolution = runtime.resolve(name);
            println!(
                "{name}\tsource={}\tdestination={}",
                resolution.source, resolution.destination
            );
        }
        if !report.abandoned.is_empty() || !report.conflicted.is_empty() {
            warn!(
                abandoned = report.abandoned.len(),
                conflicted = report.conflicted.len(),
                "Some registrations did not reach the destination"
            );
        }
        if telemetry.metrics_enabled() {
            ccns_telemetry::observe_relay(ccns_node::wiring::relay_snapshot(
                &runtime.container().gateway,
            ));
            print!("{}", encode_metrics().context("Failed to encode metrics")?);
        }
        return Ok(());
    }

    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;

    Ok(())
}
