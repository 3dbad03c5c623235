//! Default game handlers for world servers.
//!
//! Enough to make a world server usable out of the box. Applications with
//! their own game logic build a different [`HandlerTable`].

mod avatar;
mod heartbeat;
mod minigame;
mod player;

pub use avatar::{AVATAR_ACTIONS, AvatarStateHandler};
pub use heartbeat::HeartbeatHandler;
pub use minigame::GameOverHandler;
pub use player::GetPlayerHandler;

use crate::config::ServerKind;
use crate::handlers::HandlerTable;

/// Default table for a server of `kind`. Login servers get an empty one.
pub fn default_table(kind: ServerKind) -> HandlerTable {
    match kind {
        ServerKind::Login => HandlerTable::empty(),
        ServerKind::World => world_table(),
    }
}

fn world_table() -> HandlerTable {
    let mut builder = HandlerTable::builder()
        .namespaced("u", "h", HeartbeatHandler)
        .namespaced("u", "gp", GetPlayerHandler);

    for &(action, arity) in AVATAR_ACTIONS {
        builder = builder.namespaced("u", action, AvatarStateHandler::new(arity));
    }

    builder.claim("z#zo", GameOverHandler).build()
}
