//! State management module.
//!
//! Contains the per-connection [`Session`] and the shared [`World`] index.

mod conn_id;
mod session;
mod world;

pub use conn_id::ConnIdGenerator;
pub use session::{AlreadyAuthenticated, ConnectionPhase, Identity, Liveness, Session};
pub use world::{PlayerHandle, World};

#[cfg(test)]
pub(crate) use session::test_session;
