//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first when
//! present (see `main.rs`).
//!
//! | Variable             | Default              |
//! |----------------------|----------------------|
//! | `HTTP_HOST`          | `127.0.0.1`          |
//! | `HTTP_PORT`          | `8000`               |
//! | `DATABASE_PATH`      | `./liquor_store.db`  |
//! | `DB_MAX_CONNECTIONS` | `5`                  |
//! | `ALLOW_OVERSELL`     | `true`               |

use liquor_core::StockPolicy;
use liquor_db::DbConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// API server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file, created on first start
    pub database_path: PathBuf,

    /// Upper bound of the SQLite pool
    pub db_max_connections: u32,

    /// Whether a sale may drive stock below zero
    pub allow_oversell: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_path: PathBuf::from("./liquor_store.db"),
            db_max_connections: 5,
            allow_oversell: true,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            host: lookup("HTTP_HOST").unwrap_or(defaults.host),
            port: parse_or("HTTP_PORT", lookup("HTTP_PORT"), defaults.port)?,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            )?,
            allow_oversell: match lookup("ALLOW_OVERSELL") {
                Some(raw) => parse_bool("ALLOW_OVERSELL", &raw)?,
                None => defaults.allow_oversell,
            },
        };

        if config.host.trim().is_empty() {
            return Err(ConfigError::MissingRequired("HTTP_HOST".to_string()));
        }

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    pub fn stock_policy(&self) -> StockPolicy {
        StockPolicy::from_allow_oversell(self.allow_oversell)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
