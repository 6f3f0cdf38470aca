//! Spotify Web API client.
//!
//! Implements [`PlaybackProvider`] and [`TrackCatalog`] for a single
//! authenticated Spotify account. Token exchange and refresh happen outside
//! this crate; the client only carries the current access token.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::traits::{PlaybackProvider, TrackCatalog};
use crate::provider::types::{Device, Track};

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<ApiDevice>,
}

#[derive(Debug, Deserialize)]
struct ApiDevice {
    /// Restricted devices are reported with a null id.
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    device_type: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: String,
    uri: String,
    duration_ms: u64,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: Option<ApiAlbum>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

/// Converts the devices payload, dropping devices that cannot be addressed.
fn parse_devices(response: DevicesResponse) -> Vec<Device> {
    response
        .devices
        .into_iter()
        .filter_map(|d| {
            let id = d.id?;
            Some(Device {
                id,
                name: d.name,
                device_type: d.device_type,
                is_active: d.is_active,
            })
        })
        .collect()
}

/// Converts a track payload. Album images are ordered widest first, the
/// smallest one is used as thumbnail.
/// Provider ids are base62; anything else could escape the resource path.
pub(super) fn is_base62_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn parse_track(track: ApiTrack) -> Track {
    Track {
        id: track.id,
        uri: track.uri,
        duration_ms: track.duration_ms,
        name: track.name,
        artist_names: track.artists.into_iter().map(|a| a.name).collect(),
        image_url: track
            .album
            .and_then(|album| album.images.into_iter().last())
            .map(|image| image.url),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Spotify Web API client bound to one account's access token.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    access_token: RwLock<String>,
}

impl SpotifyClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client (connection pooling, timeout)
    /// * `base_url` - API base URL, without trailing slash
    /// * `access_token` - OAuth access token for the account
    pub fn new(http: Client, base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: RwLock::new(access_token.into()),
        }
    }

    /// Replaces the access token after an external refresh.
    pub fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write() = token.into();
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let token = self.access_token.read().clone();
        self.http.request(method, url).bearer_auth(token)
    }

    /// Sends a request and maps non-success statuses to [`ProviderError::HttpStatus`].
    async fn send(&self, action: &str, request: RequestBuilder) -> ProviderResult<Response> {
        log::debug!("[Spotify] {}", action);
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::warn!("[Spotify] {} failed: HTTP {} {}", action, status.as_u16(), body);
        Err(ProviderError::HttpStatus(status.as_u16(), body))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        path: &str,
    ) -> ProviderResult<T> {
        let response = self.send(action, self.request(Method::GET, path)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlaybackProvider for SpotifyClient {
    async fn play(&self, uri: &str, position_ms: u64) -> ProviderResult<()> {
        let body = json!({ "uris": [uri], "position_ms": position_ms });
        self.send("play", self.request(Method::PUT, "/me/player/play").json(&body))
            .await?;
        Ok(())
    }

    async fn pause(&self) -> ProviderResult<()> {
        self.send("pause", self.request(Method::PUT, "/me/player/pause"))
            .await?;
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> ProviderResult<()> {
        let path = format!("/me/player/seek?position_ms={}", position_ms);
        self.send("seek", self.request(Method::PUT, &path)).await?;
        Ok(())
    }

    async fn transfer_playback(&self, device_id: &str) -> ProviderResult<()> {
        let body = json!({ "device_ids": [device_id] });
        self.send("transfer", self.request(Method::PUT, "/me/player").json(&body))
            .await?;
        Ok(())
    }

    async fn list_devices(&self) -> ProviderResult<Vec<Device>> {
        let response: DevicesResponse = self.get_json("devices", "/me/player/devices").await?;
        Ok(parse_devices(response))
    }
}

#[async_trait]
impl TrackCatalog for SpotifyClient {
    async fn get_track(&self, track_id: &str) -> ProviderResult<Track> {
        if !is_base62_id(track_id) {
            return Err(ProviderError::InvalidInput(format!(
                "track id must be base62: {:?}",
                track_id
            )));
        }
        let path = format!("/tracks/{}", track_id);
        let track: ApiTrack = self.get_json("track", &path).await?;
        Ok(parse_track(track))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_devices_and_skips_restricted() {
        let payload = r#"{
            "devices": [
                { "id": "abc", "name": "Laptop", "type": "Computer", "is_active": true, "volume_percent": 50 },
                { "id": null, "name": "Restricted", "type": "Speaker", "is_active": false },
                { "id": "def", "name": "Phone", "type": "Smartphone", "is_active": false }
            ]
        }"#;
        let response: DevicesResponse = serde_json::from_str(payload).unwrap();
        let devices = parse_devices(response);

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "abc");
        assert_eq!(devices[0].device_type, "Computer");
        assert!(devices[0].is_active);
        assert_eq!(devices[1].name, "Phone");
        assert!(!devices[1].is_active);
    }

    #[test]
    fn empty_devices_payload() {
        let response: DevicesResponse = serde_json::from_str("{}").unwrap();
        assert!(parse_devices(response).is_empty());
    }

    #[test]
    fn parses_track_with_smallest_image() {
        let payload = r#"{
            "id": "4uLU6hMCjMI75M1A2tKUQC",
            "uri": "spotify:track:4uLU6hMCjMI75M1A2tKUQC",
            "duration_ms": 213573,
            "name": "Never Gonna Give You Up",
            "artists": [{ "name": "Rick Astley" }],
            "album": { "images": [
                { "url": "https://i.scdn.co/640", "width": 640 },
                { "url": "https://i.scdn.co/300", "width": 300 },
                { "url": "https://i.scdn.co/64", "width": 64 }
            ] }
        }"#;
        let track = parse_track(serde_json::from_str(payload).unwrap());

        assert_eq!(track.uri, "spotify:track:4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(track.duration_ms, 213573);
        assert_eq!(track.artist_names, vec!["Rick Astley"]);
        assert_eq!(track.image_url.as_deref(), Some("https://i.scdn.co/64"));
    }

    #[test]
    fn track_without_album_has_no_image() {
        let payload = r#"{ "id": "x", "uri": "spotify:track:x", "duration_ms": 1000, "name": "Local" }"#;
        let track = parse_track(serde_json::from_str(payload).unwrap());
        assert!(track.image_url.is_none());
        assert!(track.artist_names.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = SpotifyClient::new(Client::new(), "http://localhost:9000/v1/", "token");
        let request = client.request(Method::GET, "/me/player/devices").build().unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:9000/v1/me/player/devices");
    }

    #[test]
    fn access_token_is_sent_as_bearer() {
        let client = SpotifyClient::new(Client::new(), "http://localhost:9000/v1", "first");
        client.set_access_token("second");
        let request = client.request(Method::PUT, "/me/player/pause").build().unwrap();
        let auth = request.headers().get("authorization").unwrap();
        assert_eq!(auth.to_str().unwrap(), "Bearer second");
    }

    #[test]
    fn only_base62_ids_are_accepted() {
        assert!(is_base62_id("4uLU6hMCjMI75M1A2tKUQC"));
        assert!(!is_base62_id(""));
        assert!(!is_base62_id("../me/player/devices"));
        assert!(!is_base62_id("abc%2F..%2Fme"));
        assert!(!is_base62_id("abc?market=US"));
    }

    #[tokio::test]
    async fn path_escaping_track_id_is_rejected_before_sending() {
        // Unroutable address: a request that escaped validation would fail as Http.
        let client = SpotifyClient::new(Client::new(), "http://127.0.0.1:9/v1", "token");
        let result = client.get_track("../me/player/devices").await;
        assert!(matches!(result, Err(ProviderError::InvalidInput(_))));
    }
}
