//! `u#gp` get player.
//!
//! The store lookup runs as a deferred tail so the connection keeps
//! processing messages while it is in flight.

use crate::db::PlayerId;
use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, GameHandler};
use async_trait::async_trait;
use onyx_proto::{GamePacket, XtReply};

pub struct GetPlayerHandler;

#[async_trait]
impl GameHandler for GetPlayerHandler {
    async fn handle(&self, ctx: &mut Context<'_>, packet: &GamePacket) -> HandlerResult {
        let raw = packet.arg(1).ok_or(HandlerError::NeedMoreParams)?;
        let id: PlayerId = raw
            .parse()
            .map_err(|_| HandlerError::InvalidArgument(raw.to_string()))?;

        ctx.defer(packet.command.as_str(), move |d| async move {
            let record = d.services.store.player_by_id(id).await?;
            if !d.is_alive() {
                return Ok(());
            }
            let record = record.ok_or(HandlerError::PlayerNotFound(id))?;
            d.sender
                .send(XtReply::new("gp", -1).arg(format!("{}|{}", record.id, record.username)))
                .await
        });
        Ok(())
    }
}
