//! Lobby lifecycle and membership.
//!
//! Creating a lobby starts a virtual player driven by the leader's account;
//! closing it destroys that player. Queueing resolves track metadata through
//! the caller's own account.

use std::sync::Arc;

use crate::error::{LobbyError, LobbyResult};
use crate::events::{EventEmitter, LobbyEvent};
use crate::player::QueuedSong;
use crate::provider::ProviderError;
use crate::services::lobby_store::{Lobby, LobbyStore};
use crate::services::player_registry::PlayerRegistry;
use crate::services::session_store::Session;
use crate::utils::{new_id, now_millis};

/// Version reported for a lobby that no longer exists.
pub const DELETED_LOBBY_VERSION: i64 = -1;

pub struct LobbyService {
    store: Arc<dyn LobbyStore>,
    registry: Arc<PlayerRegistry>,
    emitter: Arc<dyn EventEmitter>,
}

impl LobbyService {
    pub fn new(
        store: Arc<dyn LobbyStore>,
        registry: Arc<PlayerRegistry>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            store,
            registry,
            emitter,
        }
    }

    /// Creates a lobby led by `leader`, who is also its first participant.
    pub async fn create_lobby(&self, leader: &Session) -> LobbyResult<Lobby> {
        let player = self.registry.create(Arc::clone(&leader.playback)).await;
        let lobby = Lobby {
            id: new_id(),
            leader_id: leader.user_id.clone(),
            participant_ids: vec![leader.user_id.clone()],
            player_id: player.id().to_string(),
            version: 0,
        };

        if let Err(e) = self.store.insert(lobby.clone()).await {
            self.registry.remove(player.id());
            return Err(e);
        }

        log::info!(
            "[Lobby] {} created by {} (player {})",
            lobby.id,
            lobby.leader_id,
            lobby.player_id
        );
        self.emitter.emit_lobby(LobbyEvent::Created {
            lobby_id: lobby.id.clone(),
            leader_id: lobby.leader_id.clone(),
            timestamp: now_millis(),
        });
        Ok(lobby)
    }

    pub async fn join(&self, lobby_id: &str, user_id: &str) -> LobbyResult<Lobby> {
        let lobby = self
            .store
            .add_participant(lobby_id, user_id)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.to_string()))?;

        log::info!("[Lobby] {} joined {}", user_id, lobby_id);
        self.emitter.emit_lobby(LobbyEvent::Joined {
            lobby_id: lobby_id.to_string(),
            user_id: user_id.to_string(),
            timestamp: now_millis(),
        });
        Ok(lobby)
    }

    pub async fn leave(&self, lobby_id: &str, user_id: &str) -> LobbyResult<Lobby> {
        let lobby = self
            .store
            .remove_participant(lobby_id, user_id)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.to_string()))?;

        log::info!("[Lobby] {} left {}", user_id, lobby_id);
        self.emitter.emit_lobby(LobbyEvent::Left {
            lobby_id: lobby_id.to_string(),
            user_id: user_id.to_string(),
            timestamp: now_millis(),
        });
        Ok(lobby)
    }

    /// Removes a lobby and destroys its player.
    pub async fn close(&self, lobby_id: &str) -> LobbyResult<()> {
        let lobby = self
            .store
            .remove(lobby_id)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.to_string()))?;

        self.registry.remove(&lobby.player_id);
        log::info!("[Lobby] {} closed", lobby_id);
        self.emitter.emit_lobby(LobbyEvent::Closed {
            lobby_id: lobby_id.to_string(),
            timestamp: now_millis(),
        });
        Ok(())
    }

    pub async fn get(&self, lobby_id: &str) -> LobbyResult<Lobby> {
        self.store
            .get(lobby_id)
            .await?
            .ok_or_else(|| LobbyError::LobbyNotFound(lobby_id.to_string()))
    }

    /// Returns the lobby's membership version, or [`DELETED_LOBBY_VERSION`]
    /// when the lobby is gone.
    pub async fn version(&self, lobby_id: &str) -> LobbyResult<i64> {
        Ok(self
            .store
            .get(lobby_id)
            .await?
            .map_or(DELETED_LOBBY_VERSION, |lobby| lobby.version as i64))
    }

    pub async fn search(
        &self,
        participant_id: Option<&str>,
        lobby_id: Option<&str>,
    ) -> LobbyResult<Option<String>> {
        self.store.find(participant_id, lobby_id).await
    }

    pub async fn count(&self) -> LobbyResult<usize> {
        self.store.count().await
    }

    /// Looks up `track_id` with the caller's account and appends it to the
    /// player's queue.
    pub async fn queue_track(
        &self,
        player_id: &str,
        session: &Session,
        track_id: &str,
    ) -> LobbyResult<QueuedSong> {
        let player = self.registry.require(player_id)?;
        let track = session
            .catalog
            .get_track(track_id)
            .await
            .map_err(|e| match e {
                ProviderError::HttpStatus(400 | 404, _) | ProviderError::InvalidInput(_) => {
                    LobbyError::InvalidRequest(format!("unknown track: {}", track_id))
                }
                other => other.into(),
            })?;

        let song = QueuedSong::from_track(track, session.user_id.clone());
        player.queue_song(song.clone()).await;
        Ok(song)
    }
}
