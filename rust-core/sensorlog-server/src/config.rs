//! Service configuration, loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8000
//! database:
//!   url: postgres://sensorlog@localhost/sensorlog
//! logging:
//!   level: debug
//!   format: compact
//! ```

use anyhow::{Context, Result};
use sensorlog_core::ServerConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerSection,
    /// Storage settings
    pub database: DatabaseSection,
    /// Log output settings
    pub logging: LoggingSection,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Keep connections open between requests
    pub keep_alive: bool,
    /// Largest accepted request body, in bytes
    pub max_body_size: usize,
    /// How long to drain open connections on shutdown
    pub shutdown_timeout_secs: u64,
    /// Value of `Access-Control-Allow-Origin`
    pub cors_allow_origin: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            keep_alive: true,
            max_body_size: 1024 * 1024,
            shutdown_timeout_secs: 30,
            cors_allow_origin: "*".to_string(),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    /// `sqlite:` or `postgres:` connection URL
    pub url: String,
    /// Pool size, backend default when unset
    pub max_connections: Option<u32>,
    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://sensorlog.db".to_string(),
            max_connections: None,
            run_migrations: true,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable single line
    Compact,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Line format
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parse YAML text. Empty text yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown keys.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Runtime settings for the HTTP server.
    ///
    /// # Errors
    ///
    /// Fails if `server.host` is not an IP address.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("server.host is not an IP address: {}", self.server.host))?;
        Ok(ServerConfig {
            address: SocketAddr::new(ip, self.server.port),
            keep_alive: self.server.keep_alive,
            shutdown_timeout: Duration::from_secs(self.server.shutdown_timeout_secs),
            max_body_size: self.server.max_body_size,
        })
    }
}
