//! Configuration for the inventory client
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with SHOP__ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{Environment, File};
use serde::Deserialize;

use crate::error::InventoryResult;
use crate::services::ExportFormat;

/// Main client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Current environment (development, production)
    pub environment: String,

    /// Remote inventory API
    pub api: ApiConfig,

    /// Report export settings
    pub export: ExportConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:3000/api`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Bearer token for the session
    #[serde(default)]
    pub token: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    /// Directory export artifacts are written to
    pub directory: PathBuf,

    pub default_format: ExportFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl ClientConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> InventoryResult<Self> {
        let environment =
            std::env::var("SHOP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("api.base_url", "http://localhost:3000/api")?
            .set_default("api.timeout_seconds", 30)?
            .set_default("api.token", "")?
            .set_default("export.directory", "exports")?
            .set_default("export.default_format", "xlsx")?
            .set_default("logging.filter", "shop_inventory=info")?
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("SHOP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
