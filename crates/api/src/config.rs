//! Server Configuration
//!
//! Layered from built-in defaults, an optional `config/neckfree.*` file and
//! `NECKFREE_*` environment variables (`__` separates nested keys, e.g.
//! `NECKFREE_DATABASE__URL`).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use storage::StoreConfig;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level (trace, debug, info, warn, error)
    pub level: String,
    /// `json` for structured output, anything else for plain text
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config/neckfree.*` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/neckfree")
    }

    /// Load configuration using the given file stem (extension optional)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("NECKFREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
