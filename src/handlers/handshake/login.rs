//! `login` handler.
//!
//! Delegates verification to the [`Authenticator`](crate::services::Authenticator)
//! and populates the session identity on success. Login servers answer with
//! the player id and a fresh login key; world servers register the player in
//! the online index, disconnecting any older connection of the same player.

use crate::config::ServerKind;
use crate::error::HandlerResult;
use crate::handlers::{Context, HandshakeHandler};
use crate::services::{AuthFailure, AuthSuccess};
use crate::state::PlayerHandle;
use async_trait::async_trait;
use onyx_proto::{HandshakeMessage, XtReply};
use tracing::{debug, info, warn};

/// Answer to a login the session cannot attempt right now.
const LOGIN_REFUSED: u16 = 101;

/// Handler for the login handshake.
pub struct LoginHandler;

#[async_trait]
impl HandshakeHandler for LoginHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &HandshakeMessage) -> HandlerResult {
        if ctx.session.is_authenticated() {
            debug!(player = ?ctx.session.id(), "Login on an authenticated session");
            return ctx.sender.send_error(LOGIN_REFUSED).await;
        }

        let Some(random_key) = ctx.session.random_key().map(str::to_string) else {
            debug!("Login before a random key was issued");
            return ctx.sender.send_error(LOGIN_REFUSED).await;
        };

        let credentials = match msg.credentials() {
            Ok(credentials) => credentials,
            Err(e) => {
                debug!(error = %e, "Malformed login dropped");
                crate::metrics::record_malformed("handshake");
                return Ok(());
            }
        };

        let result = ctx
            .services
            .authenticator
            .authenticate(&credentials, &random_key)
            .await;

        match result {
            Ok(success) => complete_login(ctx, success).await,
            Err(failure) => {
                match &failure {
                    AuthFailure::Store(e) => warn!(error = %e, "Player store failed during login"),
                    _ => info!(
                        username = %credentials.username,
                        reason = failure.label(),
                        "Login failed"
                    ),
                }
                crate::metrics::record_login(failure.label());
                ctx.sender.send_error(failure.code()).await
            }
        }
    }
}

async fn complete_login(ctx: &mut Context<'_>, success: AuthSuccess) -> HandlerResult {
    let AuthSuccess {
        identity,
        login_key,
    } = success;
    let id = identity.id;
    let username = identity.username.clone();

    ctx.session.authenticate(identity)?;
    crate::metrics::record_login("success");
    info!(
        player = id,
        username = %username,
        server = ctx.services.server.kind.as_str(),
        "Player logged in"
    );

    match ctx.services.server.kind {
        ServerKind::Login => {
            let reply = XtReply::new("l", -1)
                .arg(id)
                .arg(login_key.unwrap_or_default());
            ctx.sender.send(reply).await
        }
        ServerKind::World => {
            let conn_id = ctx.session.conn_id();
            let handle = PlayerHandle {
                conn_id,
                username,
                sender: ctx.sender.clone(),
            };
            if let Some(previous) = ctx.services.world.register(id, handle)
                && previous.conn_id != conn_id
            {
                info!(player = id, old_conn = previous.conn_id, "Duplicate login, closing older connection");
                if let Err(e) = previous.sender.disconnect().await {
                    debug!(error = %e, "Older connection already gone");
                }
            }
            ctx.sender.send(XtReply::new("l", -1)).await
        }
    }
}
