//! Avatar state updates: `u#sf` frame, `u#sa` action, `u#sb` snowball,
//! `u#se` emote, `u#ss` safe message, `u#sj` joke, `u#sg` tour guide.
//!
//! Every payload token must be an integer. The update is echoed back tagged
//! with the sender's player id.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, GameHandler};
use async_trait::async_trait;
use onyx_proto::{GamePacket, XtReply};

/// Avatar actions and their payload arity, in registration order.
pub const AVATAR_ACTIONS: &[(&str, usize)] = &[
    ("sf", 1),
    ("sa", 1),
    ("sb", 2),
    ("se", 1),
    ("ss", 1),
    ("sj", 1),
    ("sg", 1),
];

pub struct AvatarStateHandler {
    arity: usize,
}

impl AvatarStateHandler {
    pub fn new(arity: usize) -> Self {
        Self { arity }
    }
}

#[async_trait]
impl GameHandler for AvatarStateHandler {
    async fn handle(&self, ctx: &mut Context<'_>, packet: &GamePacket) -> HandlerResult {
        let id = ctx.player_id().ok_or(HandlerError::NotLoggedIn)?;

        let payload = packet.args.get(1..).unwrap_or_default();
        if payload.len() < self.arity {
            return Err(HandlerError::NeedMoreParams);
        }
        let payload = &payload[..self.arity];

        let values = payload
            .iter()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| HandlerError::InvalidArgument(token.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let reply = XtReply::new(packet.command.action(), -1)
            .arg(id)
            .with_payload(values);
        ctx.sender.send(reply).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerKind;
    use crate::handlers::test_support::Harness;

    async fn run(arity: usize, raw: &str) -> (HandlerResult, Vec<String>) {
        let mut h = Harness::new(ServerKind::World).await;
        h.login_as(101, "Rocky");
        let packet = GamePacket::parse(raw).unwrap();
        let result = AvatarStateHandler::new(arity).handle(&mut h.ctx(), &packet).await;
        (result, h.frames())
    }

    #[tokio::test]
    async fn frame_is_echoed_with_player_id() {
        let (result, frames) = run(1, "%xt%s%u#sf%-1%3%").await;
        result.unwrap();
        assert_eq!(frames, vec!["%xt%sf%-1%101%3%"]);
    }

    #[tokio::test]
    async fn snowball_takes_two_coordinates() {
        let (result, frames) = run(2, "%xt%s%u#sb%-1%120%340%").await;
        result.unwrap();
        assert_eq!(frames, vec!["%xt%sb%-1%101%120%340%"]);

        let (result, frames) = run(2, "%xt%s%u#sb%-1%120%").await;
        assert!(matches!(result, Err(HandlerError::NeedMoreParams)));
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn extra_tokens_are_ignored() {
        let (result, frames) = run(1, "%xt%s%u#se%-1%7%junk%").await;
        result.unwrap();
        assert_eq!(frames, vec!["%xt%se%-1%101%7%"]);
    }

    #[tokio::test]
    async fn non_integer_is_rejected() {
        let (result, frames) = run(1, "%xt%s%u#sa%-1%wave%").await;
        assert!(matches!(result, Err(HandlerError::InvalidArgument(t)) if t == "wave"));
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn anonymous_session_is_refused() {
        let mut h = Harness::new(ServerKind::World).await;
        let packet = GamePacket::parse("%xt%s%u#sf%-1%3%").unwrap();
        assert!(matches!(
            AvatarStateHandler::new(1).handle(&mut h.ctx(), &packet).await,
            Err(HandlerError::NotLoggedIn)
        ));
    }
}
