//! Application configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEVICE_REFRESH_SECS, DEFAULT_PAUSE_RETRY_DELAYS_MS, DEFAULT_PORT,
    DEFAULT_TICK_INTERVAL_MS, HTTP_TIMEOUT_SECS, SPOTIFY_API_BASE_URL,
};

/// Timing configuration shared by every virtual player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Interval of the local position clock (milliseconds).
    pub tick_interval_ms: u64,

    /// Interval between device list refreshes (seconds).
    pub device_refresh_interval_secs: u64,

    /// Backoff delays between pause attempts (milliseconds).
    /// An empty list disables retrying.
    pub pause_retry_delays_ms: Vec<u64>,
}

impl PlayerConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be >= 1".to_string());
        }
        if self.device_refresh_interval_secs == 0 {
            return Err("device_refresh_interval_secs must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            device_refresh_interval_secs: DEFAULT_DEVICE_REFRESH_SECS,
            pause_retry_delays_ms: DEFAULT_PAUSE_RETRY_DELAYS_MS.to_vec(),
        }
    }
}

/// Configuration for the Lobbycast application.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Port for the HTTP server.
    pub preferred_port: u16,

    /// Virtual player timing.
    pub player: PlayerConfig,

    /// Base URL of the streaming provider's Web API.
    pub spotify_api_base_url: String,

    /// Timeout for provider HTTP requests (seconds).
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferred_port: DEFAULT_PORT,
            player: PlayerConfig::default(),
            spotify_api_base_url: SPOTIFY_API_BASE_URL.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_player_config_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval_ms, 200);
        assert_eq!(config.device_refresh_interval_secs, 5);
        assert_eq!(config.pause_retry_delays_ms, vec![200, 500, 1000]);
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = PlayerConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PlayerConfig {
            device_refresh_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "player": { "tick_interval_ms": 100 } }"#)
            .unwrap();
        assert_eq!(config.player.tick_interval_ms, 100);
        assert_eq!(config.player.device_refresh_interval_secs, 5);
        assert_eq!(config.preferred_port, 8080);
        assert_eq!(config.spotify_api_base_url, "https://api.spotify.com/v1");
    }
}
