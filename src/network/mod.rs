//! Network layer: the TCP listener and per-client connection tasks.

mod connection;
mod gateway;

pub use connection::Connection;
pub use gateway::Gateway;
