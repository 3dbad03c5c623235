//! `u#h` heartbeat.

use crate::error::HandlerResult;
use crate::handlers::{Context, GameHandler};
use async_trait::async_trait;
use onyx_proto::{GamePacket, XtReply};

pub struct HeartbeatHandler;

#[async_trait]
impl GameHandler for HeartbeatHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _packet: &GamePacket) -> HandlerResult {
        ctx.sender.send(XtReply::new("h", -1)).await
    }
}
