//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::directions::DirectionsConfig;
use crate::query::CacheConfig;
use crate::store::PersistConfig;

/// Default directions service, used when only an API key is given.
const DEFAULT_DIRECTIONS_URL: &str = "https://directions.kidmap.app/v1";

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddr { name: &'static str, value: String },

    #[error("{name} is not a whole number of seconds: {value}")]
    InvalidSeconds { name: &'static str, value: String },

    #[error("{name} is not a whole number of milliseconds: {value}")]
    InvalidMillis { name: &'static str, value: String },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    /// Directory holding the persisted navigation snapshot.
    pub data_dir: PathBuf,

    /// The real directions service. `None` runs on the mock provider.
    pub directions: Option<DirectionsConfig>,

    pub cache: CacheConfig,
    pub persist: PersistConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
            directions: None,
            cache: CacheConfig::default(),
            persist: PersistConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from `KIDMAP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// anything unset or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("KIDMAP_BIND_ADDR") {
            config.bind_addr = value.parse().map_err(|_| ConfigError::InvalidAddr {
                name: "KIDMAP_BIND_ADDR",
                value,
            })?;
        }

        if let Some(value) = get("KIDMAP_DATA_DIR") {
            config.data_dir = PathBuf::from(value);
        }

        if let Some(api_key) = get("KIDMAP_DIRECTIONS_API_KEY") {
            let url = get("KIDMAP_DIRECTIONS_URL")
                .unwrap_or_else(|| DEFAULT_DIRECTIONS_URL.to_string());
            config.directions = Some(DirectionsConfig::new(url, api_key));
        }

        if let Some(value) = get("KIDMAP_STALE_SECS") {
            let secs: u64 = value.parse().map_err(|_| ConfigError::InvalidSeconds {
                name: "KIDMAP_STALE_SECS",
                value,
            })?;
            config.cache = config.cache.with_stale_time(Duration::from_secs(secs));
        }

        if let Some(value) = get("KIDMAP_PERSIST_DEBOUNCE_MS") {
            let millis: u64 = value.parse().map_err(|_| ConfigError::InvalidMillis {
                name: "KIDMAP_PERSIST_DEBOUNCE_MS",
                value,
            })?;
            config.persist = config.persist.with_debounce(Duration::from_millis(millis));
        }

        Ok(config)
    }
}
