pub mod config;
pub mod error;
pub mod whitelist;

pub use config::FleetConfig;
pub use error::{ConfigError, ConfigResult};
pub use whitelist::DeviceWhitelist;
