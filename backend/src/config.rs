//! Configuration management for the back-office server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with BACKOFFICE__ prefix

use std::net::SocketAddr;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub inventory: InventoryConfig,

    pub reporting: ReportingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection before the store reports itself unavailable
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Alerts returned by the dashboard widget when the caller gives no limit
    pub low_stock_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportingConfig {
    /// Length of the sales report window when no dates are given
    pub default_range_days: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> AppResult<Self> {
        Ok(Self::layered()?)
    }

    /// Address the server binds to
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                AppError::Configuration(format!(
                    "invalid server address {}:{}: {}",
                    self.server.host, self.server.port, e
                ))
            })
    }

    fn layered() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BACKOFFICE__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("inventory.low_stock_limit", 5)?
            .set_default("reporting.default_range_days", 30)?
            // Environment-specific file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // BACKOFFICE__DATABASE__URL and friends
            .add_source(
                Environment::with_prefix("BACKOFFICE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests and tooling that never touch the network
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/backoffice_test".to_string(),
                max_connections: 2,
                min_connections: 0,
                acquire_timeout_secs: 1,
            },
            inventory: InventoryConfig { low_stock_limit: 5 },
            reporting: ReportingConfig {
                default_range_days: 30,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
