//! Collaborators the dispatch core talks to.
//!
//! [`Services`] bundles everything a handler may reach beyond its own
//! session: server identity, the online-player index, the player store and
//! the authenticator. It is built once at startup and shared read-only.

pub mod auth;

pub use auth::{AuthFailure, AuthSuccess, Authenticator, StoreAuthenticator};

use crate::config::{ServerConfig, ServerKind};
use crate::db::PlayerStore;
use crate::state::World;
use std::sync::Arc;

/// Identity of this server process.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub id: u32,
    pub name: String,
    pub kind: ServerKind,
}

impl From<&ServerConfig> for ServerInfo {
    fn from(config: &ServerConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            kind: config.kind,
        }
    }
}

/// Shared collaborators.
pub struct Services {
    pub server: ServerInfo,
    pub world: World,
    pub store: Arc<dyn PlayerStore>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl Services {
    pub fn new(
        server: ServerInfo,
        store: Arc<dyn PlayerStore>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            server,
            world: World::new(),
            store,
            authenticator,
        }
    }
}
