//! Application bootstrap and dependency wiring.
//!
//! This module is the composition root: the one place where the HTTP client,
//! stores, player registry and event bridge are created and wired together.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::error::{LobbyError, LobbyResult};
use crate::events::{BroadcastEventBridge, EventEmitter, LoggingEventEmitter};
use crate::runtime::TokioSpawner;
use crate::services::{InMemoryLobbyStore, LobbyService, LobbyStore, PlayerRegistry, SessionStore};
use crate::state::Config;

/// Container for all bootstrapped services.
#[derive(Clone)]
pub struct BootstrappedServices {
    /// Live virtual players, one per lobby.
    pub registry: Arc<PlayerRegistry>,
    /// Lobby lifecycle and membership.
    pub lobby_service: Arc<LobbyService>,
    /// Session tokens of authenticated participants.
    pub sessions: Arc<SessionStore>,
    /// Event bridge feeding the server-sent events endpoint.
    pub event_bridge: Arc<BroadcastEventBridge>,
    /// Shared HTTP client for connection pooling.
    http_client: Client,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
}

impl BootstrappedServices {
    /// Returns the shared HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    /// Initiates graceful shutdown of all services.
    pub fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        // Stops every player's clock and device refresh
        self.cancel_token.cancel();
        self.registry.shutdown_all();

        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Creates the shared HTTP client for all provider communication.
fn create_http_client(timeout_secs: u64) -> LobbyResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LobbyError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Bootstraps all application services with their dependencies.
///
/// Services are created in dependency order:
///
/// 1. Shared infrastructure (HTTP client, event bridge, cancellation token)
/// 2. Player registry (depends on the event bridge and token)
/// 3. Lobby store and lobby service (depend on the registry)
/// 4. Session store
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the player configuration is invalid or the HTTP
/// client cannot be built.
pub fn bootstrap_services(config: &Config) -> LobbyResult<BootstrappedServices> {
    config
        .player
        .validate()
        .map_err(|e| LobbyError::Configuration(format!("Invalid player configuration: {}", e)))?;

    let spawner = TokioSpawner::current();
    let http_client = create_http_client(config.http_timeout_secs)?;

    // Every event is also logged at debug level
    let event_bridge = Arc::new(BroadcastEventBridge::new(EVENT_CHANNEL_CAPACITY));
    event_bridge.set_external_emitter(Arc::new(LoggingEventEmitter));

    let cancel_token = CancellationToken::new();

    let registry = Arc::new(PlayerRegistry::new(
        config.player.clone(),
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        spawner,
        cancel_token.clone(),
    ));

    let store: Arc<dyn LobbyStore> = Arc::new(InMemoryLobbyStore::new());
    let lobby_service = Arc::new(LobbyService::new(
        store,
        Arc::clone(&registry),
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
    ));

    let sessions = Arc::new(SessionStore::new());

    Ok(BootstrappedServices {
        registry,
        lobby_service,
        sessions,
        event_bridge,
        http_client,
        cancel_token,
    })
}
