//! `z#zo` game over.
//!
//! Claimed through the override layer so the minigame subsystem owns it
//! regardless of what the general `z` table holds.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, GameHandler};
use async_trait::async_trait;
use onyx_proto::{GamePacket, XtReply};

/// Score points per coin.
const SCORE_PER_COIN: u32 = 10;

pub struct GameOverHandler;

#[async_trait]
impl GameHandler for GameOverHandler {
    async fn handle(&self, ctx: &mut Context<'_>, packet: &GamePacket) -> HandlerResult {
        let raw = packet.arg(1).ok_or(HandlerError::NeedMoreParams)?;
        let score: u32 = raw
            .parse()
            .map_err(|_| HandlerError::InvalidArgument(raw.to_string()))?;

        let coins = score / SCORE_PER_COIN;
        ctx.sender.send(XtReply::new("zo", -1).arg(coins)).await
    }
}
