//! Session tokens mapped to authenticated streaming accounts.

use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{LobbyError, LobbyResult};
use crate::provider::{PlaybackProvider, StreamingAccount, TrackCatalog};
use crate::utils::new_id;

/// An authenticated participant.
///
/// Both handles point at the same account; they are kept separately so the
/// player and the catalog lookups can each take the trait they need.
#[derive(Clone)]
pub struct Session {
    pub user_id: String,
    pub playback: Arc<dyn PlaybackProvider>,
    pub catalog: Arc<dyn TrackCatalog>,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account and returns a new opaque session token.
    pub fn register<A>(&self, user_id: impl Into<String>, account: Arc<A>) -> String
    where
        A: StreamingAccount + 'static,
    {
        let token = new_id();
        let session = Session {
            user_id: user_id.into(),
            playback: account.clone(),
            catalog: account,
        };
        log::info!("[Sessions] Registered session for {}", session.user_id);
        self.sessions.insert(token.clone(), session);
        token
    }

    /// Resolves a token to its session.
    pub fn resolve(&self, token: &str) -> LobbyResult<Session> {
        self.sessions
            .get(token)
            .map(|r| r.value().clone())
            .ok_or_else(|| LobbyError::Unauthorized("unknown session token".to_string()))
    }

    /// Revokes a token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
