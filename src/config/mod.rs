//! Service configuration
//!
//! [`ConfigService`] snapshots the process environment (plus an optional
//! `.env` file) into a concurrent map, and [`AppConfig`] is the typed view
//! the rest of the service is built from.

use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumString};
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORE_URI: &str = "memory://";
const DEFAULT_INIT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported store URI: {0}")]
    UnsupportedStore(String),
}

/// Key/value configuration source
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Load `.env` (if present) and snapshot the process environment
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment overrides from {}", path.display());
        }

        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Parse `key` if set, otherwise fall back to `default`
    pub fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

/// What `POST /api/product` answers with
///
/// `Empty` keeps the historical contract: 201 with no body, the generated id
/// is not disclosed. `Created` returns the stored product and a `Location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CreateResponseMode {
    #[default]
    Empty,
    Created,
}

/// Typed service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_uri: String,
    pub create_response: CreateResponseMode,
    pub init_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_uri: DEFAULT_STORE_URI.to_string(),
            create_response: CreateResponseMode::default(),
            init_timeout: Duration::from_secs(DEFAULT_INIT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_config(config: &ConfigService) -> Result<Self, ConfigError> {
        Ok(Self {
            host: config
                .get("HOST")
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: config.parse_or("PORT", DEFAULT_PORT)?,
            store_uri: config
                .get("STORE_URI")
                .unwrap_or_else(|| DEFAULT_STORE_URI.to_string()),
            create_response: config.parse_or("CREATE_RESPONSE", CreateResponseMode::default())?,
            init_timeout: Duration::from_secs(
                config.parse_or("INIT_TIMEOUT_SECS", DEFAULT_INIT_TIMEOUT_SECS)?,
            ),
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
