use serde::{Deserialize, Serialize};

use crate::provider::Track;

/// A song in a player's queue.
///
/// Entries are immutable once queued; the queue only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedSong {
    pub track_id: String,
    pub uri: String,
    pub duration_ms: u64,
    pub name: String,
    pub artist_names: Vec<String>,
    pub image_url: Option<String>,
    /// User id of the participant who queued the song.
    pub queuer: String,
}

impl QueuedSong {
    /// Builds a queue entry from provider track metadata.
    pub fn from_track(track: Track, queuer: impl Into<String>) -> Self {
        Self {
            track_id: track.id,
            uri: track.uri,
            duration_ms: track.duration_ms,
            name: track.name,
            artist_names: track.artist_names,
            image_url: track.image_url,
            queuer: queuer.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_fixtures::track;

    #[test]
    fn from_track_keeps_metadata_and_queuer() {
        let song = QueuedSong::from_track(track("abc", 3000), "alice");
        assert_eq!(song.track_id, "abc");
        assert_eq!(song.uri, "spotify:track:abc");
        assert_eq!(song.duration_ms, 3000);
        assert_eq!(song.queuer, "alice");
    }

    #[test]
    fn serializes_camel_case() {
        let song = QueuedSong::from_track(track("abc", 3000), "alice");
        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["trackId"], "abc");
        assert_eq!(json["durationMs"], 3000);
        assert!(json["imageUrl"].is_null());
    }
}
