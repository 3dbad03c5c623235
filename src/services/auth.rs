//! Login verification.
//!
//! The dispatch core only sees the [`Authenticator`] trait. The default
//! [`StoreAuthenticator`] checks handshake digests against the player store
//! using the login/world split:
//!
//! - **login** servers verify `sha256(password ++ random_key)` and issue a
//!   fresh login key;
//! - **world** servers verify `sha256(login_key ++ random_key)`.

use crate::config::ServerKind;
use crate::db::{PlayerStore, StoreError};
use crate::security::Clock;
use crate::security::password::{digest_matches, expected_digest, generate_key};
use crate::state::Identity;
use async_trait::async_trait;
use onyx_proto::Credentials;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A verified login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    pub identity: Identity,
    /// Key issued by a login server for the next world login.
    pub login_key: Option<String>,
}

/// Why a login was refused.
#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("unknown user {0:?}")]
    UnknownUser(String),
    #[error("wrong password")]
    WrongPassword,
    #[error("account banned")]
    Banned,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthFailure {
    /// Error code sent to the client.
    pub fn code(&self) -> u16 {
        match self {
            Self::UnknownUser(_) => 100,
            Self::WrongPassword | Self::Store(_) => 101,
            Self::Banned => 900,
        }
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnknownUser(_) => "unknown_user",
            Self::WrongPassword => "wrong_password",
            Self::Banned => "banned",
            Self::Store(_) => "store_error",
        }
    }
}

/// Verifies login credentials against the random key of the session.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        credentials: &Credentials,
        random_key: &str,
    ) -> Result<AuthSuccess, AuthFailure>;
}

/// [`Authenticator`] backed by a [`PlayerStore`].
pub struct StoreAuthenticator {
    store: Arc<dyn PlayerStore>,
    kind: ServerKind,
    clock: Arc<dyn Clock>,
}

impl StoreAuthenticator {
    pub fn new(store: Arc<dyn PlayerStore>, kind: ServerKind, clock: Arc<dyn Clock>) -> Self {
        Self { store, kind, clock }
    }
}

#[async_trait]
impl Authenticator for StoreAuthenticator {
    async fn authenticate(
        &self,
        credentials: &Credentials,
        random_key: &str,
    ) -> Result<AuthSuccess, AuthFailure> {
        let record = self
            .store
            .player_by_name(&credentials.username)
            .await?
            .ok_or_else(|| AuthFailure::UnknownUser(credentials.username.clone()))?;

        let secret = match self.kind {
            ServerKind::Login => record.password.as_str(),
            ServerKind::World => match record.login_key.as_deref() {
                Some(key) => key,
                None => {
                    debug!(player = record.id, "World login without a login key");
                    return Err(AuthFailure::WrongPassword);
                }
            },
        };

        if !digest_matches(&credentials.password, &expected_digest(secret, random_key)) {
            return Err(AuthFailure::WrongPassword);
        }

        if record.banned {
            warn!(player = record.id, username = %record.username, "Banned player tried to log in");
            return Err(AuthFailure::Banned);
        }

        let login_key = match self.kind {
            ServerKind::Login => {
                let key = generate_key();
                self.store.set_login_key(record.id, &key).await?;
                Some(key)
            }
            ServerKind::World => {
                self.store.touch_login(record.id, self.clock.now()).await?;
                None
            }
        };

        Ok(AuthSuccess {
            identity: Identity {
                id: record.id,
                username: record.username,
            },
            login_key,
        })
    }
}
