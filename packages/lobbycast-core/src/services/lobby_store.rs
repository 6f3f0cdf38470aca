//! Lobby membership storage.
//!
//! [`LobbyStore`] is the persistence seam for lobbies; [`InMemoryLobbyStore`]
//! keeps them in a `DashMap` for the lifetime of the process.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use crate::error::LobbyResult;

/// A lobby: its leader, participants and the player it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lobby {
    pub id: String,
    pub leader_id: String,
    /// Participant user ids in join order. The leader joins first.
    pub participant_ids: Vec<String>,
    pub player_id: String,
    /// Incremented on every membership change.
    pub version: u64,
}

/// Persistence for lobbies.
///
/// Membership updates return `None` when the lobby does not exist.
#[async_trait]
pub trait LobbyStore: Send + Sync {
    async fn insert(&self, lobby: Lobby) -> LobbyResult<()>;

    async fn get(&self, lobby_id: &str) -> LobbyResult<Option<Lobby>>;

    /// Adds a participant. Joining twice is not a change.
    async fn add_participant(&self, lobby_id: &str, user_id: &str) -> LobbyResult<Option<Lobby>>;

    /// Removes a participant. Leaving without being a member is not a change.
    async fn remove_participant(
        &self,
        lobby_id: &str,
        user_id: &str,
    ) -> LobbyResult<Option<Lobby>>;

    async fn remove(&self, lobby_id: &str) -> LobbyResult<Option<Lobby>>;

    /// Returns the id of a lobby that has `participant_id` as a member or
    /// whose id is `lobby_id`.
    async fn find(
        &self,
        participant_id: Option<&str>,
        lobby_id: Option<&str>,
    ) -> LobbyResult<Option<String>>;

    async fn count(&self) -> LobbyResult<usize>;
}

#[derive(Default)]
pub struct InMemoryLobbyStore {
    lobbies: DashMap<String, Lobby>,
}

impl InMemoryLobbyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LobbyStore for InMemoryLobbyStore {
    async fn insert(&self, lobby: Lobby) -> LobbyResult<()> {
        self.lobbies.insert(lobby.id.clone(), lobby);
        Ok(())
    }

    async fn get(&self, lobby_id: &str) -> LobbyResult<Option<Lobby>> {
        Ok(self.lobbies.get(lobby_id).map(|r| r.value().clone()))
    }

    async fn add_participant(&self, lobby_id: &str, user_id: &str) -> LobbyResult<Option<Lobby>> {
        Ok(self.lobbies.get_mut(lobby_id).map(|mut lobby| {
            if !lobby.participant_ids.iter().any(|id| id == user_id) {
                lobby.participant_ids.push(user_id.to_string());
                lobby.version += 1;
            }
            lobby.clone()
        }))
    }

    async fn remove_participant(
        &self,
        lobby_id: &str,
        user_id: &str,
    ) -> LobbyResult<Option<Lobby>> {
        Ok(self.lobbies.get_mut(lobby_id).map(|mut lobby| {
            let before = lobby.participant_ids.len();
            lobby.participant_ids.retain(|id| id != user_id);
            if lobby.participant_ids.len() != before {
                lobby.version += 1;
            }
            lobby.clone()
        }))
    }

    async fn remove(&self, lobby_id: &str) -> LobbyResult<Option<Lobby>> {
        Ok(self.lobbies.remove(lobby_id).map(|(_, lobby)| lobby))
    }

    async fn find(
        &self,
        participant_id: Option<&str>,
        lobby_id: Option<&str>,
    ) -> LobbyResult<Option<String>> {
        let found = self.lobbies.iter().find(|r| {
            let lobby = r.value();
            participant_id.is_some_and(|p| lobby.participant_ids.iter().any(|id| id == p))
                || lobby_id.is_some_and(|l| lobby.id == l)
        });
        Ok(found.map(|r| r.key().clone()))
    }

    async fn count(&self) -> LobbyResult<usize> {
        Ok(self.lobbies.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby(id: &str, leader: &str) -> Lobby {
        Lobby {
            id: id.to_string(),
            leader_id: leader.to_string(),
            participant_ids: vec![leader.to_string()],
            player_id: format!("player-{}", id),
            version: 0,
        }
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let store = InMemoryLobbyStore::new();
        store.insert(lobby("l1", "alice")).await.unwrap();

        let joined = store.add_participant("l1", "bob").await.unwrap().unwrap();
        assert_eq!(joined.participant_ids, vec!["alice", "bob"]);
        assert_eq!(joined.version, 1);

        let again = store.add_participant("l1", "bob").await.unwrap().unwrap();
        assert_eq!(again.participant_ids.len(), 2);
        assert_eq!(again.version, 1);
    }

    #[tokio::test]
    async fn leave_bumps_only_members() {
        let store = InMemoryLobbyStore::new();
        store.insert(lobby("l1", "alice")).await.unwrap();

        let left = store.remove_participant("l1", "carol").await.unwrap().unwrap();
        assert_eq!(left.version, 0);

        let left = store.remove_participant("l1", "alice").await.unwrap().unwrap();
        assert!(left.participant_ids.is_empty());
        assert_eq!(left.version, 1);
    }

    #[tokio::test]
    async fn membership_changes_on_missing_lobby_return_none() {
        let store = InMemoryLobbyStore::new();
        assert!(store.add_participant("nope", "bob").await.unwrap().is_none());
        assert!(store.remove_participant("nope", "bob").await.unwrap().is_none());
        assert!(store.remove("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_participant_or_id() {
        let store = InMemoryLobbyStore::new();
        store.insert(lobby("l1", "alice")).await.unwrap();
        store.insert(lobby("l2", "bob")).await.unwrap();

        assert_eq!(
            store.find(Some("bob"), None).await.unwrap().as_deref(),
            Some("l2")
        );
        assert_eq!(
            store.find(None, Some("l1")).await.unwrap().as_deref(),
            Some("l1")
        );
        assert_eq!(
            store.find(Some("nobody"), Some("l2")).await.unwrap().as_deref(),
            Some("l2")
        );
        assert!(store.find(Some("nobody"), None).await.unwrap().is_none());
        assert!(store.find(None, None).await.unwrap().is_none());
    }
}
