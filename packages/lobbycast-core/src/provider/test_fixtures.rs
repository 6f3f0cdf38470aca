//! Shared in-memory provider for tests.
//!
//! [`MockProvider`] records every call in order and can be told to fail a
//! given operation a fixed number of times.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::player::QueuedSong;
use crate::provider::spotify::is_base62_id;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::traits::{PlaybackProvider, TrackCatalog};
use crate::provider::types::{Device, Track};

/// A provider call as observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Play { uri: String, position_ms: u64 },
    Pause,
    Seek(u64),
    Transfer(String),
    ListDevices,
    GetTrack(String),
}

/// Operations whose failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Play,
    Pause,
    Seek,
    Transfer,
    ListDevices,
    GetTrack,
}

#[derive(Default)]
pub struct MockProvider {
    calls: Mutex<Vec<ProviderCall>>,
    devices: Mutex<Vec<Device>>,
    tracks: Mutex<HashMap<String, Track>>,
    failures: Mutex<HashMap<MockOp, usize>>,
    play_delay: Mutex<Option<Duration>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider reporting the given devices.
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let mock = Self::new();
        *mock.devices.lock() = devices;
        mock
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock() = devices;
    }

    pub fn add_track(&self, track: Track) {
        self.tracks.lock().insert(track.id.clone(), track);
    }

    /// Fails the next `times` calls of `op`.
    pub fn fail(&self, op: MockOp, times: usize) {
        self.failures.lock().insert(op, times);
    }

    /// Fails every call of `op` until [`MockProvider::recover`].
    pub fn fail_always(&self, op: MockOp) {
        self.fail(op, usize::MAX);
    }

    /// Makes every `play` call take `delay` before answering.
    pub fn set_play_delay(&self, delay: Duration) {
        *self.play_delay.lock() = Some(delay);
    }

    pub fn recover(&self, op: MockOp) {
        self.failures.lock().remove(&op);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    /// Calls excluding device polling, which runs on its own schedule.
    pub fn commands(&self) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != ProviderCall::ListDevices)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, op: MockOp, call: ProviderCall) -> ProviderResult<()> {
        self.calls.lock().push(call);

        let mut failures = self.failures.lock();
        if let Some(remaining) = failures.get_mut(&op) {
            if *remaining > 0 {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                return Err(ProviderError::HttpStatus(
                    503,
                    format!("simulated {:?} failure", op),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PlaybackProvider for MockProvider {
    async fn play(&self, uri: &str, position_ms: u64) -> ProviderResult<()> {
        let delay = *self.play_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.record(
            MockOp::Play,
            ProviderCall::Play {
                uri: uri.to_string(),
                position_ms,
            },
        )
    }

    async fn pause(&self) -> ProviderResult<()> {
        self.record(MockOp::Pause, ProviderCall::Pause)
    }

    async fn seek(&self, position_ms: u64) -> ProviderResult<()> {
        self.record(MockOp::Seek, ProviderCall::Seek(position_ms))
    }

    async fn transfer_playback(&self, device_id: &str) -> ProviderResult<()> {
        self.record(
            MockOp::Transfer,
            ProviderCall::Transfer(device_id.to_string()),
        )
    }

    async fn list_devices(&self) -> ProviderResult<Vec<Device>> {
        self.record(MockOp::ListDevices, ProviderCall::ListDevices)?;
        Ok(self.devices.lock().clone())
    }
}

#[async_trait]
impl TrackCatalog for MockProvider {
    async fn get_track(&self, track_id: &str) -> ProviderResult<Track> {
        self.record(MockOp::GetTrack, ProviderCall::GetTrack(track_id.to_string()))?;
        if !is_base62_id(track_id) {
            return Err(ProviderError::InvalidInput(track_id.to_string()));
        }
        self.tracks
            .lock()
            .get(track_id)
            .cloned()
            .ok_or_else(|| ProviderError::HttpStatus(404, "non existing id".into()))
    }
}

pub fn device(id: &str, is_active: bool) -> Device {
    Device {
        id: id.to_string(),
        name: format!("Device {}", id),
        device_type: "Computer".to_string(),
        is_active,
    }
}

pub fn track(id: &str, duration_ms: u64) -> Track {
    Track {
        id: id.to_string(),
        uri: format!("spotify:track:{}", id),
        duration_ms,
        name: format!("Song {}", id),
        artist_names: vec!["Artist".to_string()],
        image_url: None,
    }
}

pub fn song(id: &str, duration_ms: u64) -> QueuedSong {
    QueuedSong::from_track(track(id, duration_ms), "queuer")
}
