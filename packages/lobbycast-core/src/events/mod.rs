//! Event system for change notifications.
//!
//! This module provides:
//! - [`EventEmitter`] trait for domain services to emit events
//! - [`BroadcastEventBridge`] for the server-sent events transport
//! - Event types for players and lobbies
//!
//! Player events carry only the new version. Observers compare it with the
//! version they last rendered and re-read the snapshot when it moved.

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

/// Events broadcast to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum BroadcastEvent {
    /// Events from virtual players.
    Player(PlayerEvent),

    /// Events related to lobby membership.
    Lobby(LobbyEvent),
}

/// Events emitted by a virtual player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// The player's observable state changed.
    VersionChanged {
        #[serde(rename = "playerId")]
        player_id: String,
        /// The new version counter value.
        version: u64,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The player was destroyed together with its lobby.
    Closed {
        #[serde(rename = "playerId")]
        player_id: String,
        timestamp: u64,
    },
}

/// Events related to lobby lifecycle and membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LobbyEvent {
    /// A lobby was created.
    Created {
        #[serde(rename = "lobbyId")]
        lobby_id: String,
        #[serde(rename = "leaderId")]
        leader_id: String,
        timestamp: u64,
    },
    /// A participant joined.
    Joined {
        #[serde(rename = "lobbyId")]
        lobby_id: String,
        #[serde(rename = "userId")]
        user_id: String,
        timestamp: u64,
    },
    /// A participant left.
    Left {
        #[serde(rename = "lobbyId")]
        lobby_id: String,
        #[serde(rename = "userId")]
        user_id: String,
        timestamp: u64,
    },
    /// The lobby was closed.
    Closed {
        #[serde(rename = "lobbyId")]
        lobby_id: String,
        timestamp: u64,
    },
}
