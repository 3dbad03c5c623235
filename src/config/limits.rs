//! Connection and framing limits configuration.

use serde::Deserialize;

use super::defaults::{default_max_connections, default_max_packet_len, default_outgoing_queue};

/// Connection and framing limits.
///
/// These bound the resources a single connection, or the whole listener,
/// can consume.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum concurrent client connections (default: 256).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Maximum inbound frame length in bytes (default: 1024).
    #[serde(default = "default_max_packet_len")]
    pub max_packet_len: usize,
    /// Per-connection outgoing queue capacity (default: 64).
    #[serde(default = "default_outgoing_queue")]
    pub outgoing_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            max_packet_len: default_max_packet_len(),
            outgoing_queue: default_outgoing_queue(),
        }
    }
}
