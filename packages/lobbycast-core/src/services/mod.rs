//! Application services layer.
//!
//! This module contains the services that sit between the API layer and the
//! virtual players: the player registry, lobby membership and sessions.

pub mod lobby_service;
pub mod lobby_store;
pub mod player_registry;
pub mod session_store;

pub use lobby_service::LobbyService;
pub use lobby_store::{InMemoryLobbyStore, Lobby, LobbyStore};
pub use player_registry::PlayerRegistry;
pub use session_store::{Session, SessionStore};
