//! Domain types returned by the streaming provider.

use serde::{Deserialize, Serialize};

/// A playback-capable endpoint of the leader's streaming account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Provider device identifier.
    pub id: String,
    /// User-visible device name (e.g., "Kitchen Speaker").
    pub name: String,
    /// Device category reported by the provider (e.g., "Computer", "Smartphone").
    #[serde(rename = "type")]
    pub device_type: String,
    /// Whether the provider currently considers this device the active output.
    pub is_active: bool,
}

/// Track metadata needed to queue and play a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Provider track identifier.
    pub id: String,
    /// Playable URI (e.g., `spotify:track:...`).
    pub uri: String,
    /// Track duration in milliseconds.
    pub duration_ms: u64,
    /// Track title.
    pub name: String,
    /// Names of the credited artists, in provider order.
    pub artist_names: Vec<String>,
    /// Album art URL, if the provider has one.
    pub image_url: Option<String>,
}
