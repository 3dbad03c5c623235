//! Unified error handling for onyxd.
//!
//! Handler failures never cross connections. The dispatcher logs them and
//! labels them for metrics via [`HandlerError::error_code`]; only a closed
//! or backed-up outgoing queue ends the session.

use crate::db::{PlayerId, StoreError};
use crate::state::AlreadyAuthenticated;
use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error(transparent)]
    AlreadyAuthenticated(#[from] AlreadyAuthenticated),

    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("send queue full")]
    SendQueueFull,
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotLoggedIn => "not_logged_in",
            Self::AlreadyAuthenticated(_) => "already_authenticated",
            Self::PlayerNotFound(_) => "player_not_found",
            Self::Store(_) => "store_error",
            Self::ConnectionClosed => "connection_closed",
            Self::SendQueueFull => "send_queue_full",
        }
    }

    /// Whether the connection must be closed after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::SendQueueFull)
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
