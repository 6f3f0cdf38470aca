//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to services.
//! It provides the router construction and server startup functionality.

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Client;
use thiserror::Error;

use crate::bootstrap::BootstrappedServices;
use crate::events::BroadcastEventBridge;
use crate::services::{LobbyService, PlayerRegistry, SessionStore};
use crate::state::Config;

pub mod http;
pub mod response;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// This is a thin wrapper that holds references to services.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PlayerRegistry>,
    pub lobby_service: Arc<LobbyService>,
    pub sessions: Arc<SessionStore>,
    /// Event bridge for the server-sent events stream.
    pub event_bridge: Arc<BroadcastEventBridge>,
    /// Application configuration.
    pub config: Arc<RwLock<Config>>,
    /// Shared HTTP client for per-session provider clients.
    pub http_client: Client,
}

impl AppState {
    /// Builds the API state from bootstrapped services.
    pub fn new(services: &BootstrappedServices, config: Config) -> Self {
        Self {
            registry: Arc::clone(&services.registry),
            lobby_service: Arc::clone(&services.lobby_service),
            sessions: Arc::clone(&services.sessions),
            event_bridge: Arc::clone(&services.event_bridge),
            config: Arc::new(RwLock::new(config)),
            http_client: services.http_client().clone(),
        }
    }
}

/// Starts the HTTP server on the configured port.
pub async fn start_server(state: AppState) -> Result<(), ServerError> {
    let port = state.config.read().preferred_port;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("[Server] Listening on http://0.0.0.0:{}", port);
    let app = http::create_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
