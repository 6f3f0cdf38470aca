use serde::Serialize;

use super::song::QueuedSong;
use crate::provider::Device;

/// Immutable view of a player, republished after every mutation.
///
/// `position` is the player's local estimate; it is reconciled with the
/// output device only on resume and seek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub position: u64,
    pub max_position: u64,
    pub is_song_playing: bool,
    /// `None` while the queue is empty.
    pub queue_position: Option<usize>,
    pub queue: Vec<QueuedSong>,
    pub current_device_id: Option<String>,
    pub devices: Vec<Device>,
    pub version: u64,
}
