//! fleetd.toml configuration parser.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Command-line flags are layered on top by the daemon.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_PORT: u16 = 6733;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_WHITELIST: &str = "devices.csv";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub server: ServerConfig,
    pub whitelist: WhitelistConfig,
    pub results: ResultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhitelistConfig {
    /// Device ID list loaded once at startup.
    pub path: PathBuf,
    /// Reject requests for devices not on the list.
    pub enforce: bool,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_WHITELIST),
            enforce: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Append a line here for every successful stats read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl FleetConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Socket address the HTTP server listens on.
    pub fn listen_addr(&self) -> ConfigResult<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind
            .parse()
            .map_err(|_| ConfigError::Address(self.server.bind.clone()))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
