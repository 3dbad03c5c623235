//! Handler traits.
//!
//! - [`HandshakeHandler`]: bootstrap actions of the markup handshake
//!   (version check, random key, login). Runs before authentication.
//! - [`GameHandler`]: game commands. Only ever invoked after the session
//!   guard has accepted the packet, so the session is authenticated.

use super::context::Context;
use crate::error::HandlerResult;
use async_trait::async_trait;
use onyx_proto::{GamePacket, HandshakeMessage};

/// Handler for one handshake action.
#[async_trait]
pub trait HandshakeHandler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &HandshakeMessage) -> HandlerResult;
}

/// Handler for one or more game command keys.
///
/// `packet.args[0]` is the room token; the payload starts at `args[1]`.
#[async_trait]
pub trait GameHandler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, packet: &GamePacket) -> HandlerResult;
}
