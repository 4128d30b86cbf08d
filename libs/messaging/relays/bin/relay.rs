//! Telemetry relay binary
//!
//! Usage:
//!   relay
//!   relay --config config/relay.toml
//!   MESSAGE_PORT=9000 WATCHER_PORT=9001 relay --log-level debug --json-logs

use anyhow::{Context, Result};
use clap::Parser;
use relay_core::{Relay, RelayConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Telemetry status relay: ingests source reports, notifies watchers")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    info!("Starting telemetry relay");

    let config =
        RelayConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    info!(
        ingest_port = config.ingest.port,
        watcher_port = config.watcher.port,
        "Configuration loaded"
    );

    let relay = Relay::bind(config).await.context("Failed to start relay")?;

    relay
        .run_until(shutdown_signal())
        .await
        .context("Relay stopped unexpectedly")?;

    info!("Relay stopped");
    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&args.log_level)
            .with_context(|| format!("Invalid log level '{}'", args.log_level))?,
    };

    if args.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await
        }
    }
}
