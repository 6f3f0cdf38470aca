//! Lobbycast Core - shared library for Lobbycast.
//!
//! Lobbycast lets a group of listeners ("lobby") share one playback queue.
//! Every participant holds their own streaming account, while the lobby
//! leader's account drives the actual audio output.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`player`]: The per-lobby virtual player state machine
//! - [`provider`]: Streaming provider abstraction and the Spotify Web API client
//! - [`services`]: Player registry, lobby and session management
//! - [`events`]: Event system for change notifications
//! - [`api`]: HTTP routes that project the services onto JSON
//! - [`runtime`]: Task spawning abstraction
//! - [`state`]: Configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`PlaybackProvider`](provider::PlaybackProvider): Remote playback control
//! - [`TrackCatalog`](provider::TrackCatalog): Track metadata lookup
//! - [`LobbyStore`](services::LobbyStore): Lobby membership persistence
//! - [`EventEmitter`](events::EventEmitter): Emitting domain events
//! - [`TaskSpawner`](runtime::TaskSpawner): Spawning background tasks

#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod events;
pub mod player;
pub mod provider;
pub mod runtime;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{ErrorCode, LobbyError, LobbyResult, ProviderError, ProviderResult};
pub use events::{
    BroadcastEvent, BroadcastEventBridge, EventEmitter, LobbyEvent, LoggingEventEmitter,
    NoopEventEmitter, PlayerEvent,
};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use state::{Config, PlayerConfig};
pub use utils::now_millis;

// Re-export player types
pub use player::{PlayerContext, PlayerSnapshot, QueuedSong, VirtualPlayer};

// Re-export provider types
pub use provider::{Device, PlaybackProvider, SpotifyClient, StreamingAccount, Track, TrackCatalog};

// Re-export service types
pub use services::{
    InMemoryLobbyStore, Lobby, LobbyService, LobbyStore, PlayerRegistry, Session, SessionStore,
};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
