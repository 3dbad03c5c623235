//! Handler context.
//!
//! Defines the [`Context`] passed to every handler: the connection's own
//! session (exclusive), its outgoing queue and the shared collaborators.

use super::middleware::ResponseSender;
use crate::db::PlayerId;
use crate::error::HandlerResult;
use crate::services::Services;
use crate::state::Session;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Handler context passed to each handler.
pub struct Context<'a> {
    /// Session of the connection that sent the message.
    pub session: &'a mut Session,
    /// Outgoing queue of this connection.
    pub sender: &'a ResponseSender,
    /// Shared collaborators.
    pub services: &'a Arc<Services>,
}

impl<'a> Context<'a> {
    pub fn new(
        session: &'a mut Session,
        sender: &'a ResponseSender,
        services: &'a Arc<Services>,
    ) -> Self {
        Self {
            session,
            sender,
            services,
        }
    }

    /// Player id of an authenticated session.
    pub fn player_id(&self) -> Option<PlayerId> {
        self.session.id()
    }

    /// Run the rest of a handler detached from the connection loop.
    ///
    /// The connection moves on to its next message immediately. The tail
    /// gets a [`Deferred`] handle instead of the session, so it cannot touch
    /// session state; it must check [`Deferred::is_alive`] before any side
    /// effect other than sending. Errors are logged and recorded, never
    /// propagated.
    pub fn defer<F, Fut>(&self, command: &str, tail: F)
    where
        F: FnOnce(Deferred) -> Fut,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let deferred = Deferred {
            sender: self.sender.clone(),
            services: Arc::clone(self.services),
            player: self.session.id(),
        };
        let command = command.to_string();
        let fut = tail(deferred);
        tokio::spawn(async move {
            if let Err(e) = fut.await {
                crate::metrics::record_command_error(&command, e.error_code());
                debug!(command = %command, error = %e, "Deferred handler failed");
            }
        });
    }
}

/// What a deferred handler tail may use.
#[derive(Clone)]
pub struct Deferred {
    pub sender: ResponseSender,
    pub services: Arc<Services>,
    /// Player id at the time the tail was spawned.
    pub player: Option<PlayerId>,
}

impl Deferred {
    /// Whether the originating connection is still open.
    pub fn is_alive(&self) -> bool {
        self.sender.is_alive()
    }
}
