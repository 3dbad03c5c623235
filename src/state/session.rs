//! Per-connection session state.
//!
//! A [`Session`] is owned by exactly one connection task and is never shared
//! with another connection. The only piece that escapes the task is the
//! [`Liveness`] flag, which deferred handler tails use to find out whether
//! the connection still exists before producing side effects.
//!
//! ## State Machine
//!
//! ```text
//! Connected ──(first handshake)──▶ Handshaking ──(login ok)──▶ Authenticated
//!     │                                 │                            │
//!     └─────────────────────────────────┴──── disconnect ────────────┘
//! ```
//!
//! `Authenticated` never reverts; disconnect is terminal.

use crate::db::PlayerId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Shared "connection is still open" flag.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the connection as gone. Idempotent.
    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connected,
    Handshaking,
    Authenticated,
}

impl ConnectionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Handshaking => "handshaking",
            Self::Authenticated => "authenticated",
        }
    }
}

/// Who the client logged in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: PlayerId,
    pub username: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("session already authenticated as {0}")]
pub struct AlreadyAuthenticated(pub PlayerId);

/// State of one client connection.
#[derive(Debug)]
pub struct Session {
    conn_id: u64,
    addr: SocketAddr,
    phase: ConnectionPhase,
    identity: Option<Identity>,
    random_key: Option<String>,
    /// Command key -> next allowed unix timestamp. Only throttled keys appear.
    throttle: HashMap<String, i64>,
    liveness: Liveness,
}

impl Session {
    pub fn new(conn_id: u64, addr: SocketAddr, liveness: Liveness) -> Self {
        Self {
            conn_id,
            addr,
            phase: ConnectionPhase::Connected,
            identity: None,
            random_key: None,
            throttle: HashMap::new(),
            liveness,
        }
    }

    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Player id, set once the login handshake succeeds.
    pub fn id(&self) -> Option<PlayerId> {
        self.identity.as_ref().map(|i| i.id)
    }

    /// Display name, set once the login handshake succeeds.
    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.username.as_str())
    }

    /// True when both id and display name are present.
    pub fn is_authenticated(&self) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|i| !i.username.is_empty())
    }

    /// Record that the client started the handshake.
    pub fn enter_handshake(&mut self) {
        if self.phase == ConnectionPhase::Connected {
            self.phase = ConnectionPhase::Handshaking;
        }
    }

    /// Populate the identity. Succeeds exactly once per session.
    pub fn authenticate(&mut self, identity: Identity) -> Result<(), AlreadyAuthenticated> {
        if let Some(existing) = &self.identity {
            return Err(AlreadyAuthenticated(existing.id));
        }
        self.identity = Some(identity);
        self.phase = ConnectionPhase::Authenticated;
        Ok(())
    }

    pub fn random_key(&self) -> Option<&str> {
        self.random_key.as_deref()
    }

    /// Replace the handshake key. Only the random-key handshake calls this.
    pub fn set_random_key(&mut self, key: String) {
        self.random_key = Some(key);
    }

    pub fn next_allowed(&self, key: &str) -> Option<i64> {
        self.throttle.get(key).copied()
    }

    pub fn set_next_allowed(&mut self, key: &str, at: i64) {
        match self.throttle.get_mut(key) {
            Some(slot) => *slot = at,
            None => {
                self.throttle.insert(key.to_string(), at);
            }
        }
    }

    /// Number of command keys with a stored cooldown.
    pub fn throttled_keys(&self) -> usize {
        self.throttle.len()
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Mark the session closed. Deferred tails stop producing side effects.
    pub fn close(&self) {
        self.liveness.kill();
    }
}

#[cfg(test)]
pub(crate) fn test_session() -> Session {
    Session::new(1, "127.0.0.1:40000".parse().unwrap(), Liveness::new())
}
