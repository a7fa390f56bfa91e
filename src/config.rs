//! Service configuration loaded from environment variables.

use std::path::PathBuf;
use thiserror::Error;

/// Reads:
/// - `HOST` (default `0.0.0.0`)
/// - `PORT` (default `8083`)
/// - `STOREFRONT_DATA_DIR`: when set, state is kept on disk there; otherwise in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: Option<PathBuf>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            data_dir: lookup("STOREFRONT_DATA_DIR").filter(|d| !d.trim().is_empty()).map(PathBuf::from),
        })
    }

    pub fn addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8083, data_dir: None }
    }
}
