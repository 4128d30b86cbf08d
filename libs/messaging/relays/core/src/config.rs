//! # Relay Configuration
//!
//! ## Purpose
//! Listener addresses and reporting cadence for the relay process.
//!
//! ## Configuration Structure
//!
//! ```toml
//! [ingest]
//! address = "0.0.0.0"   # sources connect here
//! port = 8888
//!
//! [watcher]
//! address = "0.0.0.0"   # watchers connect here
//! port = 8889
//!
//! [metrics]
//! report_interval_secs = 60   # 0 disables the periodic summary
//! ```
//!
//! Every section is optional. Within a listener section `address` defaults to
//! `0.0.0.0` and `port` is required.
//!
//! ## Loading Order
//!
//! Built-in defaults, then the TOML file (if any), then the environment:
//!
//! | Variable             | Overrides          |
//! |----------------------|--------------------|
//! | `MESSAGE_PORT`       | `ingest.port`      |
//! | `WATCHER_PORT`       | `watcher.port`     |
//! | `RELAY_BIND_ADDRESS` | both `address`es   |

use crate::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use types::{DEFAULT_INGEST_PORT, DEFAULT_WATCHER_PORT};

pub const MESSAGE_PORT_ENV: &str = "MESSAGE_PORT";
pub const WATCHER_PORT_ENV: &str = "WATCHER_PORT";
pub const BIND_ADDRESS_ENV: &str = "RELAY_BIND_ADDRESS";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_REPORT_INTERVAL_SECS: u64 = 60;

/// Main relay configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default = "ListenerConfig::ingest_default")]
    pub ingest: ListenerConfig,
    #[serde(default = "ListenerConfig::watcher_default")]
    pub watcher: ListenerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// One TCP listener
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListenerConfig {
    #[serde(default = "default_bind_address")]
    pub address: String,
    pub port: u16,
}

/// Periodic metrics summary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub report_interval_secs: u64,
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

impl ListenerConfig {
    fn ingest_default() -> Self {
        Self {
            address: default_bind_address(),
            port: DEFAULT_INGEST_PORT,
        }
    }

    fn watcher_default() -> Self {
        Self {
            address: default_bind_address(),
            port: DEFAULT_WATCHER_PORT,
        }
    }

    /// Resolve to a socket address; only literal IPs are accepted
    pub fn socket_addr(&self) -> RelayResult<SocketAddr> {
        let ip: IpAddr = self.address.parse().map_err(|e| {
            RelayError::Config(format!("Invalid bind address '{}': {}", self.address, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ingest: ListenerConfig::ingest_default(),
            watcher: ListenerConfig::watcher_default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RelayResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> RelayResult<Self> {
        toml::from_str(contents)
            .map_err(|e| RelayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Defaults or file, then process environment, then validation
    pub fn load(path: Option<&Path>) -> RelayResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> RelayResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(MESSAGE_PORT_ENV) {
            self.ingest.port = parse_port(MESSAGE_PORT_ENV, &port)?;
        }
        if let Some(port) = lookup(WATCHER_PORT_ENV) {
            self.watcher.port = parse_port(WATCHER_PORT_ENV, &port)?;
        }
        if let Some(address) = lookup(BIND_ADDRESS_ENV) {
            self.ingest.address = address.clone();
            self.watcher.address = address;
        }
        Ok(())
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> RelayResult<()> {
        let ingest = self.ingest.socket_addr()?;
        let watcher = self.watcher.socket_addr()?;

        if ingest.port() != 0 && ingest == watcher {
            return Err(RelayError::Config(format!(
                "Ingest and watcher listeners both bound to {}",
                ingest
            )));
        }

        Ok(())
    }

    /// Interval of the metrics summary log, `None` when disabled
    pub fn report_interval(&self) -> Option<Duration> {
        match self.metrics.report_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn parse_port(variable: &str, value: &str) -> RelayResult<u16> {
    value
        .trim()
        .parse()
        .map_err(|e| RelayError::Config(format!("Invalid {} '{}': {}", variable, value, e)))
}
