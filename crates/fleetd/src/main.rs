//! fleetd — the fleet metrics daemon.
//!
//! Loads the device whitelist, registers every listed device with the
//! metrics store, and serves the REST API until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! fleetd serve --devices devices.csv --port 6733 --results-log results.txt
//! ```

mod settings;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fleet_api::{ApiState, ResultsLog, build_router};
use fleet_core::{DeviceWhitelist, FleetConfig};
use fleet_store::MetricsStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::ServeArgs;

const DEFAULT_LOG_FILTER: &str = "info,fleetd=debug,fleet_api=debug,fleet_store=debug";

#[derive(Parser)]
#[command(name = "fleetd", about = "Fleet metrics daemon")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the device heartbeat and stats API.
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Serve(args) => run_serve(args.resolve()?).await,
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_serve(config: FleetConfig) -> anyhow::Result<()> {
    info!("fleet metrics daemon starting");

    let store = Arc::new(MetricsStore::new());
    let mut state = ApiState::new(Arc::clone(&store));

    // ── Device whitelist ───────────────────────────────────────

    if config.whitelist.enforce {
        let path = &config.whitelist.path;
        let whitelist = DeviceWhitelist::from_file(path)
            .with_context(|| format!("loading device whitelist {}", path.display()))?;
        for device_id in whitelist.iter() {
            store.register_device(device_id);
        }
        info!(?path, devices = whitelist.len(), "devices registered");
        state = state.with_whitelist(whitelist);
    } else {
        warn!("whitelist disabled, accepting reports from any device");
    }

    // ── Results log ────────────────────────────────────────────

    if let Some(path) = &config.results.log_path {
        let log = ResultsLog::open(path)
            .await
            .with_context(|| format!("opening results log {}", path.display()))?;
        info!(?path, "results log opened");
        state = state.with_results_log(log);
    }

    // ── API server ─────────────────────────────────────────────

    let addr = config.listen_addr()?;
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(devices = store.device_count(), "fleet metrics daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "failed to install Ctrl-C handler, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
