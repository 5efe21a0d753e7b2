// ABOUTME: Runtime configuration for the Planboard binary, read from the environment
// ABOUTME: Port, CORS origin and database location with validation of each value

use std::num::ParseIntError;
use std::path::PathBuf;

use planboard_config::{
    env_value, DEFAULT_CORS_ORIGIN, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, PLANBOARD_CORS_ORIGIN,
    PLANBOARD_DB_PATH, PLANBOARD_MAX_CONNECTIONS, PLANBOARD_PORT,
};
use planboard_storage::StoreConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid PLANBOARD_MAX_CONNECTIONS value: {0} (expected a positive integer)")]
    InvalidMaxConnections(String),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub db_path: PathBuf,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_value)
    }

    /// Build a config from any name -> value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(PLANBOARD_PORT) {
            Some(raw) => raw.parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin =
            lookup(PLANBOARD_CORS_ORIGIN).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        if !(cors_origin.starts_with("http://") || cors_origin.starts_with("https://")) {
            return Err(ConfigError::InvalidCorsOrigin(cors_origin));
        }

        let db_path = lookup(PLANBOARD_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(planboard_core::database_file);

        let max_connections = match lookup(PLANBOARD_MAX_CONNECTIONS) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidMaxConnections(raw))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Config {
            port,
            cors_origin,
            db_path,
            max_connections,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_connections: self.max_connections,
            ..StoreConfig::new(&self.db_path)
        }
    }
}
