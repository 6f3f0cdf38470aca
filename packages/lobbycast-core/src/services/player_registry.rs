//! Registry of live virtual players.
//!
//! Players are created and destroyed in lockstep with their lobbies. The
//! registry owns the root cancellation token; each player runs its background
//! tasks under a child of it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::error::{LobbyError, LobbyResult};
use crate::events::{EventEmitter, PlayerEvent};
use crate::player::{PlayerContext, VirtualPlayer};
use crate::provider::PlaybackProvider;
use crate::runtime::TokioSpawner;
use crate::state::PlayerConfig;
use crate::utils::{new_id, now_millis};

pub struct PlayerRegistry {
    players: DashMap<String, Arc<VirtualPlayer>>,
    config: PlayerConfig,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    cancel_token: CancellationToken,
}

impl PlayerRegistry {
    pub fn new(
        config: PlayerConfig,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            players: DashMap::new(),
            config,
            emitter,
            spawner,
            cancel_token,
        }
    }

    /// Starts a new player driven by `provider` and registers it under a
    /// fresh id.
    pub async fn create(&self, provider: Arc<dyn PlaybackProvider>) -> Arc<VirtualPlayer> {
        let id = new_id();
        let ctx = PlayerContext {
            config: self.config.clone(),
            emitter: Arc::clone(&self.emitter),
            spawner: self.spawner.clone(),
            cancel_token: self.cancel_token.child_token(),
        };

        let player = VirtualPlayer::start(id.clone(), provider, ctx).await;
        self.players.insert(id, Arc::clone(&player));
        log::info!("[Registry] Player {} registered ({} total)", player.id(), self.len());
        player
    }

    pub fn get(&self, player_id: &str) -> Option<Arc<VirtualPlayer>> {
        self.players.get(player_id).map(|r| Arc::clone(r.value()))
    }

    /// Like [`PlayerRegistry::get`], but a missing player is an error.
    pub fn require(&self, player_id: &str) -> LobbyResult<Arc<VirtualPlayer>> {
        self.get(player_id)
            .ok_or_else(|| LobbyError::PlayerNotFound(player_id.to_string()))
    }

    /// Unregisters a player and stops its background tasks.
    pub fn remove(&self, player_id: &str) -> Option<Arc<VirtualPlayer>> {
        let (_, player) = self.players.remove(player_id)?;
        player.shutdown();
        self.emitter.emit_player(PlayerEvent::Closed {
            player_id: player_id.to_string(),
            timestamp: now_millis(),
        });
        log::info!("[Registry] Player {} removed", player_id);
        Some(player)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Stops and unregisters every player.
    pub fn shutdown_all(&self) {
        let ids: Vec<String> = self.players.iter().map(|r| r.key().clone()).collect();
        for id in &ids {
            if let Some((_, player)) = self.players.remove(id) {
                player.shutdown();
            }
        }
        log::info!("[Registry] Shut down {} player(s)", ids.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopEventEmitter;
    use crate::provider::test_fixtures::{device, MockProvider};

    fn registry() -> PlayerRegistry {
        PlayerRegistry::new(
            PlayerConfig::default(),
            Arc::new(NoopEventEmitter),
            TokioSpawner::current(),
            CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn create_registers_player() {
        let registry = registry();
        let provider = Arc::new(MockProvider::with_devices(vec![device("d", true)]));

        let player = registry.create(provider).await;

        assert_eq!(registry.len(), 1);
        assert!(registry.get(player.id()).is_some());
        assert!(registry.require(player.id()).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn require_missing_player_is_not_found() {
        let registry = registry();
        let err = registry.require("missing").err().unwrap();
        assert!(matches!(err, LobbyError::PlayerNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn remove_unregisters_player() {
        let registry = registry();
        let player = registry.create(Arc::new(MockProvider::new())).await;

        assert!(registry.remove(player.id()).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(player.id()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_all_empties_registry() {
        let registry = registry();
        registry.create(Arc::new(MockProvider::new())).await;
        registry.create(Arc::new(MockProvider::new())).await;

        registry.shutdown_all();

        assert!(registry.is_empty());
    }
}
