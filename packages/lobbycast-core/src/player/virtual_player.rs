//! Virtual player state machine.
//!
//! A [`VirtualPlayer`] mirrors one lobby's playback: the queue, a cursor into
//! it, an estimated position, the selected output device and a version
//! counter that moves exactly once per observable change.
//!
//! Every command, clock tick and device refresh runs under one async mutex for
//! its whole duration, provider round trips included. Readers never take that
//! mutex; they read the snapshot published after each mutation.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{oneshot, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use super::playback::{next_cursor, previous_cursor, Playback};
use super::snapshot::PlayerSnapshot;
use super::song::QueuedSong;
use crate::events::{EventEmitter, PlayerEvent};
use crate::provider::retry::with_retry;
use crate::provider::{Device, PlaybackProvider};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::state::PlayerConfig;
use crate::utils::now_millis;

/// Shared dependencies handed to each player at construction.
#[derive(Clone)]
pub struct PlayerContext {
    pub config: PlayerConfig,
    pub emitter: Arc<dyn EventEmitter>,
    pub spawner: TokioSpawner,
    /// Cancelling this token stops every background task of the player.
    pub cancel_token: CancellationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Mutable player state. Only touched while holding [`VirtualPlayer::core`].
struct PlayerCore {
    queue: Vec<QueuedSong>,
    playback: Playback,
    devices: Vec<Device>,
    current_device_id: Option<String>,
    version: u64,
}

impl PlayerCore {
    fn new(devices: Vec<Device>) -> Self {
        Self {
            queue: Vec::new(),
            playback: Playback::Empty,
            devices,
            current_device_id: None,
            version: 0,
        }
    }

    fn current_song(&self) -> Option<&QueuedSong> {
        self.playback.cursor().and_then(|c| self.queue.get(c))
    }

    fn max_position(&self) -> u64 {
        self.current_song().map_or(0, |song| song.duration_ms)
    }

    fn snapshot(&self, id: &str) -> PlayerSnapshot {
        PlayerSnapshot {
            id: id.to_string(),
            position: self.playback.position_ms(),
            max_position: self.max_position(),
            is_song_playing: self.playback.is_playing(),
            queue_position: self.playback.cursor(),
            queue: self.queue.clone(),
            current_device_id: self.current_device_id.clone(),
            devices: self.devices.clone(),
            version: self.version,
        }
    }
}

/// Shared playback state for one lobby.
///
/// Commands never return provider failures: a failed command leaves the
/// player paused and the failure logged.
pub struct VirtualPlayer {
    id: String,
    provider: Arc<dyn PlaybackProvider>,
    config: PlayerConfig,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    cancel_token: CancellationToken,
    core: Mutex<PlayerCore>,
    published: RwLock<PlayerSnapshot>,
    me: Weak<VirtualPlayer>,
}

impl VirtualPlayer {
    /// Creates a player, fetches the initial device list and starts the
    /// device refresh task.
    ///
    /// A failed initial fetch starts the player with no known devices. The
    /// initial list does not count as a change, so a new player is at
    /// version 0.
    pub async fn start(
        id: String,
        provider: Arc<dyn PlaybackProvider>,
        ctx: PlayerContext,
    ) -> Arc<Self> {
        let devices = match provider.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                log::warn!("[Player] {} initial device list failed: {}", id, e);
                Vec::new()
            }
        };

        let core = PlayerCore::new(devices);
        let snapshot = core.snapshot(&id);

        let player = Arc::new_cyclic(|me| Self {
            id,
            provider,
            config: ctx.config,
            emitter: ctx.emitter,
            spawner: ctx.spawner,
            cancel_token: ctx.cancel_token,
            core: Mutex::new(core),
            published: RwLock::new(snapshot),
            me: me.clone(),
        });

        player.spawn_device_refresh();
        log::info!(
            "[Player] {} started with {} device(s)",
            player.id,
            player.published.read().devices.len()
        );
        player
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> u64 {
        self.published.read().position
    }

    pub fn max_position(&self) -> u64 {
        self.published.read().max_position
    }

    pub fn is_song_playing(&self) -> bool {
        self.published.read().is_song_playing
    }

    pub fn queue_position(&self) -> Option<usize> {
        self.published.read().queue_position
    }

    pub fn queue(&self) -> Vec<QueuedSong> {
        self.published.read().queue.clone()
    }

    pub fn current_device_id(&self) -> Option<String> {
        self.published.read().current_device_id.clone()
    }

    pub fn devices(&self) -> Vec<Device> {
        self.published.read().devices.clone()
    }

    pub fn version(&self) -> u64 {
        self.published.read().version
    }

    /// Returns the last published state.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.published.read().clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a song. The first song of an empty queue starts playing.
    pub async fn queue_song(&self, song: QueuedSong) {
        self.run_detached(move |player| async move { player.queue_song_command(song).await })
            .await;
    }

    pub async fn resume(&self) {
        self.run_detached(|player| async move {
            let mut core = player.core.lock().await;
            player.resume_locked(&mut core).await;
        })
        .await;
    }

    pub async fn pause(&self) {
        self.run_detached(|player| async move {
            let mut core = player.core.lock().await;
            player.pause_locked(&mut core).await;
        })
        .await;
    }

    /// Moves to the next song, wrapping to the first after the last.
    pub async fn next(&self) {
        self.run_detached(|player| async move {
            let mut core = player.core.lock().await;
            player.skip_locked(&mut core, Direction::Forward).await;
        })
        .await;
    }

    /// Moves to the previous song, staying on the first.
    pub async fn previous(&self) {
        self.run_detached(|player| async move {
            let mut core = player.core.lock().await;
            player.skip_locked(&mut core, Direction::Backward).await;
        })
        .await;
    }

    /// Seeks within the current song.
    pub async fn jump(&self, position_ms: u64) {
        self.run_detached(move |player| async move { player.jump_command(position_ms).await })
            .await;
    }

    /// Transfers playback to `device_id`.
    ///
    /// The id is not checked against the known device list; the provider is
    /// the authority on which devices exist.
    pub async fn select_device(&self, device_id: &str) {
        let device_id = device_id.to_string();
        self.run_detached(move |player| async move {
            player.select_device_command(&device_id).await
        })
        .await;
    }

    /// Runs a command on its own task and waits for it.
    ///
    /// A command spans several provider round trips. Once started it runs to
    /// completion even if the caller stops waiting, so a half-applied
    /// mutation is never left unpublished.
    async fn run_detached<F, Fut>(&self, command: F)
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Some(player) = self.me.upgrade() else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        let task = command(player);
        self.spawner.spawn(async move {
            task.await;
            let _ = done_tx.send(());
        });
        if done_rx.await.is_err() {
            log::warn!("[Player] {} command task ended early", self.id);
        }
    }

    async fn queue_song_command(&self, song: QueuedSong) {
        let mut core = self.core.lock().await;
        let was_empty = core.queue.is_empty();

        log::info!(
            "[Player] {} queued '{}' ({}) by {}",
            self.id,
            song.name,
            song.track_id,
            song.queuer
        );
        core.queue.push(song);
        if was_empty {
            core.playback = Playback::Paused {
                cursor: 0,
                position_ms: 0,
            };
        }
        self.bump(&mut core);

        if was_empty {
            self.resume_locked(&mut core).await;
        }
    }

    async fn jump_command(&self, position_ms: u64) {
        let mut core = self.core.lock().await;
        if core.current_song().is_none() {
            return;
        }

        match self.provider.seek(position_ms).await {
            Ok(()) => {
                let max = core.max_position();
                core.playback.set_position(position_ms.min(max));
                self.bump(&mut core);
            }
            Err(e) => {
                log::warn!("[Player] {} seek to {}ms failed: {}", self.id, position_ms, e);
                self.pause_locked(&mut core).await;
            }
        }
    }

    async fn select_device_command(&self, device_id: &str) {
        let mut core = self.core.lock().await;

        match self.provider.transfer_playback(device_id).await {
            Ok(()) => {
                log::info!("[Player] {} output device -> {}", self.id, device_id);
                core.current_device_id = Some(device_id.to_string());
                self.bump(&mut core);
            }
            Err(e) => {
                log::warn!(
                    "[Player] {} transfer to {} failed: {}",
                    self.id,
                    device_id,
                    e
                );
                self.pause_locked(&mut core).await;
            }
        }
    }

    /// Stops all background tasks.
    pub fn shutdown(&self) {
        log::info!("[Player] {} shutting down", self.id);
        self.cancel_token.cancel();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State transitions (caller holds the core lock)
    // ─────────────────────────────────────────────────────────────────────────

    async fn resume_locked(&self, core: &mut PlayerCore) {
        let (cursor, position_ms) = match core.playback {
            Playback::Paused {
                cursor,
                position_ms,
            } => (cursor, position_ms),
            _ => return,
        };
        let Some(uri) = core.queue.get(cursor).map(|song| song.uri.clone()) else {
            return;
        };
        if core.devices.is_empty() {
            log::info!("[Player] {} has no devices, staying paused", self.id);
            return;
        }

        let mut device_changed = false;
        if !core.devices.iter().any(|d| d.is_active) {
            let fallback = core.devices[0].id.clone();
            if let Err(e) = self.provider.transfer_playback(&fallback).await {
                log::warn!(
                    "[Player] {} fallback transfer to {} failed: {}",
                    self.id,
                    fallback,
                    e
                );
                return;
            }
            device_changed = core.current_device_id.as_deref() != Some(fallback.as_str());
            core.current_device_id = Some(fallback);
        }

        let started = match self.provider.play(&uri, position_ms).await {
            Ok(()) => self.provider.seek(position_ms).await,
            Err(e) => Err(e),
        };

        match started {
            Ok(()) => {
                core.playback = Playback::Playing {
                    cursor,
                    position_ms,
                    clock: self.start_clock(),
                };
                self.bump(core);
            }
            Err(e) => {
                log::warn!("[Player] {} resume failed: {}", self.id, e);
                if device_changed {
                    self.bump(core);
                }
            }
        }
    }

    /// Pauses the provider with bounded retry. Local state becomes paused
    /// even when every attempt fails.
    async fn pause_locked(&self, core: &mut PlayerCore) {
        if !core.playback.is_playing() {
            return;
        }

        let provider = &self.provider;
        if let Err(e) = with_retry("pause", &self.config.pause_retry_delays_ms, || {
            provider.pause()
        })
        .await
        {
            log::warn!(
                "[Player] {} pause failed after retries, pausing locally: {}",
                self.id,
                e
            );
        }

        core.playback.stop();
        self.bump(core);
    }

    async fn skip_locked(&self, core: &mut PlayerCore, direction: Direction) {
        let Some(cursor) = core.playback.cursor() else {
            return;
        };
        let target = match direction {
            Direction::Forward => next_cursor(cursor, core.queue.len()),
            Direction::Backward => previous_cursor(cursor),
        };

        // Navigation while paused only moves the cursor.
        if !core.playback.is_playing() {
            let changed = target != cursor || core.playback.position_ms() != 0;
            core.playback.set_cursor(target);
            core.playback.set_position(0);
            if changed {
                self.bump(core);
            }
            return;
        }

        let Some(uri) = core.queue.get(target).map(|song| song.uri.clone()) else {
            return;
        };
        match self.provider.play(&uri, 0).await {
            Ok(()) => {
                core.playback.set_cursor(target);
                core.playback.set_position(0);
                self.bump(core);
            }
            Err(e) => {
                log::warn!(
                    "[Player] {} {:?} to song {} failed: {}",
                    self.id,
                    direction,
                    target,
                    e
                );
                self.pause_locked(core).await;
            }
        }
    }

    async fn advance_locked(&self, core: &mut PlayerCore, elapsed_ms: u64) {
        if !core.playback.is_playing() {
            return;
        }

        let max = core.max_position();
        let position = core.playback.position_ms().saturating_add(elapsed_ms);
        if position >= max {
            core.playback.set_position(max);
            self.skip_locked(core, Direction::Forward).await;
        } else {
            core.playback.set_position(position);
        }
        self.publish(core);
    }

    fn publish(&self, core: &PlayerCore) {
        *self.published.write() = core.snapshot(&self.id);
    }

    fn bump(&self, core: &mut PlayerCore) {
        core.version += 1;
        self.publish(core);
        self.emitter.emit_player(PlayerEvent::VersionChanged {
            player_id: self.id.clone(),
            version: core.version,
            timestamp: now_millis(),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Background tasks
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts the position clock. Dropping the returned guard stops it.
    fn start_clock(&self) -> DropGuard {
        let token = self.cancel_token.child_token();
        let task_token = token.clone();
        let weak = self.me.clone();
        let tick_ms = self.config.tick_interval_ms;
        let tick = Duration::from_millis(tick_ms);

        self.spawner.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        let Some(player) = weak.upgrade() else { break };
                        player.advance_clock_for(&task_token, tick_ms).await;
                    }
                }
            }
        });

        token.drop_guard()
    }

    async fn advance_clock_for(&self, token: &CancellationToken, elapsed_ms: u64) {
        let mut core = self.core.lock().await;
        // The clock may have been stopped while this tick waited for the lock.
        if token.is_cancelled() {
            return;
        }
        self.advance_locked(&mut core, elapsed_ms).await;
    }

    #[cfg(test)]
    pub(crate) async fn advance_clock(&self, elapsed_ms: u64) {
        let mut core = self.core.lock().await;
        self.advance_locked(&mut core, elapsed_ms).await;
    }

    fn spawn_device_refresh(&self) {
        let token = self.cancel_token.clone();
        let weak = self.me.clone();
        let period = Duration::from_secs(self.config.device_refresh_interval_secs);

        self.spawner.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let Some(player) = weak.upgrade() else { break };
                        player.refresh_devices().await;
                    }
                }
            }
            log::debug!("[Player] Device refresh stopped");
        });
    }

    /// Re-reads the device list and bumps when it differs.
    pub(crate) async fn refresh_devices(&self) {
        let mut core = self.core.lock().await;
        match self.provider.list_devices().await {
            Ok(devices) => {
                if devices != core.devices {
                    log::debug!(
                        "[Player] {} device list changed ({} -> {})",
                        self.id,
                        core.devices.len(),
                        devices.len()
                    );
                    core.devices = devices;
                    self.bump(&mut core);
                }
            }
            Err(e) if e.is_transient() => {
                log::debug!("[Player] {} device refresh failed: {}", self.id, e)
            }
            Err(e) => log::warn!("[Player] {} device refresh failed: {}", self.id, e),
        }
    }
}

impl Drop for VirtualPlayer {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
