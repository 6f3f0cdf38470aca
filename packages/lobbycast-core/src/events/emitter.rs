//! Event emitter abstraction for decoupling services from transport.
//!
//! Players and the lobby service depend on the [`EventEmitter`] trait rather
//! than on a concrete broadcast channel.

use super::{LobbyEvent, PlayerEvent};

/// Trait for emitting domain events without knowledge of transport.
///
/// Emission must never block: virtual players call it while holding their
/// command lock.
pub trait EventEmitter: Send + Sync {
    /// Emits a virtual player event.
    fn emit_player(&self, event: PlayerEvent);

    /// Emits a lobby lifecycle event.
    fn emit_lobby(&self, event: LobbyEvent);
}

/// No-op emitter for tests and embedders without observers.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_player(&self, _event: PlayerEvent) {}

    fn emit_lobby(&self, _event: LobbyEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_player(&self, event: PlayerEvent) {
        tracing::debug!(?event, "player_event");
    }

    fn emit_lobby(&self, event: LobbyEvent) {
        tracing::debug!(?event, "lobby_event");
    }
}
