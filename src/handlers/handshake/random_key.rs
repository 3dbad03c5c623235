//! `rndK` handler.

use crate::error::HandlerResult;
use crate::handlers::{Context, HandshakeHandler};
use crate::security::password::generate_key;
use async_trait::async_trait;
use onyx_proto::{HandshakeMessage, SysReply};

/// Issues a fresh random key and stores it on the session.
///
/// The key replaces any previous one; nothing else touches it.
pub struct RandomKeyHandler;

#[async_trait]
impl HandshakeHandler for RandomKeyHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _msg: &HandshakeMessage) -> HandlerResult {
        let key = generate_key();
        ctx.session.set_random_key(key.clone());
        ctx.sender.send(SysReply::random_key(&key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerKind;
    use crate::handlers::handshake::VersionHandler;
    use crate::handlers::test_support::Harness;

    fn msg(action: &str) -> HandshakeMessage {
        HandshakeMessage::parse(&format!("<msg t='sys'><body action='{action}' r='-1'></body></msg>"))
            .unwrap()
    }

    #[tokio::test]
    async fn key_is_stored_and_sent() {
        let mut h = Harness::new(ServerKind::World).await;
        RandomKeyHandler.handle(&mut h.ctx(), &msg("rndK")).await.unwrap();

        let key = h.session.random_key().unwrap().to_string();
        assert_eq!(
            h.frames(),
            vec![format!("<msg t=\"sys\"><body action=\"rndK\" r=\"-1\"><k>{key}</k></body></msg>")]
        );
    }

    #[tokio::test]
    async fn version_check_keeps_key_and_new_request_replaces_it() {
        let mut h = Harness::new(ServerKind::World).await;
        RandomKeyHandler.handle(&mut h.ctx(), &msg("rndK")).await.unwrap();
        let first = h.session.random_key().unwrap().to_string();

        VersionHandler.handle(&mut h.ctx(), &msg("verChk")).await.unwrap();
        assert_eq!(h.session.random_key(), Some(first.as_str()));

        RandomKeyHandler.handle(&mut h.ctx(), &msg("rndK")).await.unwrap();
        assert_ne!(h.session.random_key(), Some(first.as_str()));
    }
}
