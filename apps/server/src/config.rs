//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use lobbycast_core::constants::{
    DEFAULT_DEVICE_REFRESH_SECS, DEFAULT_PAUSE_RETRY_DELAYS_MS, DEFAULT_PORT,
    DEFAULT_TICK_INTERVAL_MS, HTTP_TIMEOUT_SECS, SPOTIFY_API_BASE_URL,
};
use lobbycast_core::{Config, PlayerConfig};
use serde::Deserialize;

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to.
    /// Override: `LOBBYCAST_BIND_PORT`
    pub bind_port: u16,

    /// Interval of each player's position clock in milliseconds.
    /// Override: `LOBBYCAST_TICK_INTERVAL_MS`
    pub tick_interval_ms: u64,

    /// Interval in seconds between device list refreshes.
    /// Override: `LOBBYCAST_DEVICE_REFRESH_INTERVAL`
    pub device_refresh_interval: u64,

    /// Backoff delays between pause attempts in milliseconds.
    pub pause_retry_delays_ms: Vec<u64>,

    /// Streaming provider Web API base URL.
    /// Override: `LOBBYCAST_SPOTIFY_API_URL`
    pub spotify_api_url: String,

    /// Timeout for provider HTTP requests in seconds.
    pub http_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_port: DEFAULT_PORT,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            device_refresh_interval: DEFAULT_DEVICE_REFRESH_SECS,
            pause_retry_delays_ms: DEFAULT_PAUSE_RETRY_DELAYS_MS.to_vec(),
            spotify_api_url: SPOTIFY_API_BASE_URL.to_string(),
            http_timeout: HTTP_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LOBBYCAST_BIND_PORT") {
            if let Ok(port) = val.parse() {
                self.bind_port = port;
            }
        }

        if let Ok(val) = std::env::var("LOBBYCAST_TICK_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                self.tick_interval_ms = interval;
            }
        }

        if let Ok(val) = std::env::var("LOBBYCAST_DEVICE_REFRESH_INTERVAL") {
            if let Ok(interval) = val.parse() {
                self.device_refresh_interval = interval;
            }
        }

        if let Ok(val) = std::env::var("LOBBYCAST_SPOTIFY_API_URL") {
            if !val.is_empty() {
                self.spotify_api_url = val;
            }
        }
    }

    /// Converts to lobbycast-core's Config type.
    pub fn to_core_config(&self) -> Config {
        Config {
            preferred_port: self.bind_port,
            player: PlayerConfig {
                tick_interval_ms: self.tick_interval_ms,
                device_refresh_interval_secs: self.device_refresh_interval,
                pause_retry_delays_ms: self.pause_retry_delays_ms.clone(),
            },
            spotify_api_base_url: self.spotify_api_url.clone(),
            http_timeout_secs: self.http_timeout,
        }
    }
}
