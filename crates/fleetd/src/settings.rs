//! Command-line flags layered over the config file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use fleet_core::FleetConfig;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to a fleetd.toml config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Device whitelist (one ID per line).
    #[arg(long)]
    pub devices: Option<PathBuf>,

    /// Append every computed stats line to this file.
    #[arg(long)]
    pub results_log: Option<PathBuf>,

    /// Accept reports from any device ID.
    #[arg(long)]
    pub no_whitelist: bool,
}

impl ServeArgs {
    /// Load the config file (or defaults) and apply flag overrides.
    pub fn resolve(&self) -> anyhow::Result<FleetConfig> {
        let mut config = match &self.config {
            Some(path) => FleetConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => FleetConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(devices) = &self.devices {
            config.whitelist.path = devices.clone();
        }
        if let Some(results_log) = &self.results_log {
            config.results.log_path = Some(results_log.clone());
        }
        if self.no_whitelist {
            config.whitelist.enforce = false;
        }
        Ok(config)
    }
}
