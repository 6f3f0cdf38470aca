//! Trait abstractions for streaming provider operations.
//!
//! These traits enable dependency injection for testability and modularity.
//! The virtual player depends on [`PlaybackProvider`] rather than on the
//! concrete Spotify client.

use async_trait::async_trait;

use crate::provider::error::ProviderResult;
use crate::provider::types::{Device, Track};

/// Trait for remote playback control on one streaming account.
///
/// Every call is a network round trip that may fail. Callers treat each
/// command as best-effort.
#[async_trait]
pub trait PlaybackProvider: Send + Sync {
    /// Starts playing a single track on the account's active device.
    ///
    /// # Arguments
    /// * `uri` - Playable track URI
    /// * `position_ms` - Offset into the track to start from
    async fn play(&self, uri: &str, position_ms: u64) -> ProviderResult<()>;

    /// Pauses playback on the active device.
    async fn pause(&self) -> ProviderResult<()>;

    /// Seeks within the currently playing track.
    ///
    /// # Arguments
    /// * `position_ms` - Target offset in milliseconds
    async fn seek(&self, position_ms: u64) -> ProviderResult<()>;

    /// Moves playback to another device.
    ///
    /// # Arguments
    /// * `device_id` - Provider identifier of the target device
    async fn transfer_playback(&self, device_id: &str) -> ProviderResult<()>;

    /// Lists the account's currently available playback devices.
    async fn list_devices(&self) -> ProviderResult<Vec<Device>>;
}

/// Trait for track metadata lookups.
///
/// Used by the lobby service to turn a track id into a queue entry.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Fetches metadata for a single track.
    ///
    /// # Arguments
    /// * `track_id` - Provider track identifier
    async fn get_track(&self, track_id: &str) -> ProviderResult<Track>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Traits (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for a fully authenticated streaming account.
#[async_trait]
pub trait StreamingAccount: PlaybackProvider + TrackCatalog {}

/// Blanket implementation for any type implementing both traits.
impl<T: PlaybackProvider + TrackCatalog> StreamingAccount for T {}
