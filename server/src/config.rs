//! Configuration management for the server.

use std::env;
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Path of the JSON store snapshot; `None` keeps the store in memory only
    pub store_path: Option<PathBuf>,
    /// Optional shared secret; when set, requests must carry it as a bearer token
    pub auth_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let store_path = env::var("STORE_PATH").ok().map(PathBuf::from);

        let auth_secret = env::var("AUTH_SECRET").ok();

        Ok(Self {
            host,
            port,
            store_path,
            auth_secret,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,
}
