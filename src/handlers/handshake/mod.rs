//! Bootstrap handlers for the markup handshake.
//!
//! - `verChk`: [`VersionHandler`]
//! - `rndK`: [`RandomKeyHandler`]
//! - `login`: [`LoginHandler`]

mod login;
mod random_key;
mod version;

pub use login::LoginHandler;
pub use random_key::RandomKeyHandler;
pub use version::VersionHandler;
