//! Bridge implementation that maps domain events to broadcast transport.
//!
//! The [`BroadcastEventBridge`] lives at the boundary between domain services
//! and the server-sent events endpoint.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::emitter::EventEmitter;
use super::{BroadcastEvent, LobbyEvent, PlayerEvent};

/// Bridges domain events to a `tokio::sync::broadcast` channel.
///
/// An optional external emitter (for example [`super::LoggingEventEmitter`])
/// receives every event as well and can be set after construction.
#[derive(Clone)]
pub struct BroadcastEventBridge {
    tx: broadcast::Sender<BroadcastEvent>,
    external_emitter: Arc<RwLock<Option<Arc<dyn EventEmitter>>>>,
}

impl BroadcastEventBridge {
    /// Creates a new bridge with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            external_emitter: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets an external emitter that also receives every event.
    pub fn set_external_emitter(&self, emitter: Arc<dyn EventEmitter>) {
        *self.external_emitter.write() = Some(emitter);
    }

    /// Returns a new receiver for the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<BroadcastEvent> {
        self.tx.subscribe()
    }
}

/// Generates an [`EventEmitter`] method that forwards to the external emitter
/// (if set) and then sends to the broadcast channel.
macro_rules! impl_emit {
    ($method:ident, $event_ty:ty, $variant:ident) => {
        fn $method(&self, event: $event_ty) {
            if let Some(ref emitter) = *self.external_emitter.read() {
                emitter.$method(event.clone());
            }
            if let Err(e) = self.tx.send(BroadcastEvent::$variant(event)) {
                log::trace!("[EventBridge] No broadcast receivers: {}", e);
            }
        }
    };
}

impl EventEmitter for BroadcastEventBridge {
    impl_emit!(emit_player, PlayerEvent, Player);
    impl_emit!(emit_lobby, LobbyEvent, Lobby);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoopEventEmitter;

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bridge = BroadcastEventBridge::new(8);
        let mut rx = bridge.subscribe();

        bridge.emit_player(PlayerEvent::VersionChanged {
            player_id: "p".into(),
            version: 7,
            timestamp: 0,
        });

        match rx.recv().await.unwrap() {
            BroadcastEvent::Player(PlayerEvent::VersionChanged { version, .. }) => {
                assert_eq!(version, 7)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn emitting_without_subscribers_is_harmless() {
        let bridge = BroadcastEventBridge::new(8);
        bridge.set_external_emitter(Arc::new(NoopEventEmitter));
        bridge.emit_lobby(LobbyEvent::Closed {
            lobby_id: "l".into(),
            timestamp: 0,
        });
    }
}
