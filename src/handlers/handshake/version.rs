//! `verChk` handler.

use crate::error::HandlerResult;
use crate::handlers::{Context, HandshakeHandler};
use async_trait::async_trait;
use onyx_proto::{HandshakeMessage, SysReply};
use tracing::debug;

/// Acknowledges every client version.
pub struct VersionHandler;

#[async_trait]
impl HandshakeHandler for VersionHandler {
    async fn handle(&self, ctx: &mut Context<'_>, msg: &HandshakeMessage) -> HandlerResult {
        debug!(version = ?msg.version(), "Version check");
        ctx.sender.send(SysReply::api_ok()).await
    }
}
