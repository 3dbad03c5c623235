//! Index of players online on this server.
//!
//! This is the only state shared between connections. Each entry holds the
//! sender of the owning connection so another connection can ask it to close
//! (duplicate login) without touching its session.

use crate::db::PlayerId;
use crate::handlers::ResponseSender;
use dashmap::DashMap;

/// An online player and a way to reach their connection.
#[derive(Clone)]
pub struct PlayerHandle {
    pub conn_id: u64,
    pub username: String,
    pub sender: ResponseSender,
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("conn_id", &self.conn_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Online players keyed by id.
#[derive(Debug, Default)]
pub struct World {
    players: DashMap<PlayerId, PlayerHandle>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player, returning the handle it replaced, if any.
    pub fn register(&self, id: PlayerId, handle: PlayerHandle) -> Option<PlayerHandle> {
        let previous = self.players.insert(id, handle);
        crate::metrics::set_online_players(self.players.len());
        previous
    }

    /// Remove a player, but only if `conn_id` still owns the entry.
    ///
    /// A connection that lost its entry to a newer login must not evict the
    /// newer one when it shuts down.
    pub fn unregister(&self, id: PlayerId, conn_id: u64) -> bool {
        let removed = self
            .players
            .remove_if(&id, |_, handle| handle.conn_id == conn_id)
            .is_some();
        if removed {
            crate::metrics::set_online_players(self.players.len());
        }
        removed
    }

    pub fn get(&self, id: PlayerId) -> Option<PlayerHandle> {
        self.players.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
