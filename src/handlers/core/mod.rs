//! Core handler infrastructure.
//!
//! The dispatcher, handler tables, handler traits, the per-message context
//! and the outgoing-queue middleware.

pub mod context;
pub mod dispatcher;
pub mod middleware;
pub mod registry;
pub mod traits;

pub use context::{Context, Deferred};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use middleware::{Outbound, ResponseSender};
pub use registry::{HandlerLayer, HandlerTable, HandlerTableBuilder, HandshakeTable, Resolved};
pub use traits::{GameHandler, HandshakeHandler};
