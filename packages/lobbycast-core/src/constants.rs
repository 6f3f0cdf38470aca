//! Default values and fixed identifiers.
//!
//! Tunable values here are only defaults; the effective values live in
//! [`Config`](crate::state::Config) and can be overridden by the server.

// ─────────────────────────────────────────────────────────────────────────────
// Service Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "lobbycast";

/// Default HTTP port for the server.
pub const DEFAULT_PORT: u16 = 8080;

// ─────────────────────────────────────────────────────────────────────────────
// Virtual Player
// ─────────────────────────────────────────────────────────────────────────────

/// Interval of the local position clock (milliseconds).
///
/// Each tick advances the optimistic playback position by this amount.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;

/// Interval between device list refreshes (seconds).
pub const DEFAULT_DEVICE_REFRESH_SECS: u64 = 5;

/// Backoff delays between pause attempts (milliseconds).
///
/// The first attempt is immediate, so the total number of attempts is
/// `len + 1`.
pub const DEFAULT_PAUSE_RETRY_DELAYS_MS: [u64; 3] = [200, 500, 1000];

// ─────────────────────────────────────────────────────────────────────────────
// Streaming Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Base URL of the Spotify Web API.
pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Timeout for provider HTTP requests (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Capacity of the broadcast channel for change events.
///
/// Slow subscribers that fall further behind than this lose the oldest events
/// and should re-read state through the version endpoints.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;
