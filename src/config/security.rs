//! Session guard and admission control configuration.

use serde::Deserialize;

use super::defaults::{
    default_allow_reserved, default_connection_burst_per_ip, default_reserved_char,
    default_violation_code,
};

/// Security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Error code sent before a guard disconnect (default: 800).
    #[serde(default = "default_violation_code")]
    pub violation_code: u16,
    /// Payload separator that must not appear in game tokens (default: `|`).
    #[serde(default = "default_reserved_char")]
    pub reserved_char: char,
    /// Command keys allowed to carry the reserved character in arguments.
    #[serde(default = "default_allow_reserved")]
    pub allow_reserved: Vec<String>,
    /// New connections per IP allowed in a burst before rate limiting.
    #[serde(default = "default_connection_burst_per_ip")]
    pub connection_burst_per_ip: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            violation_code: default_violation_code(),
            reserved_char: default_reserved_char(),
            allow_reserved: default_allow_reserved(),
            connection_burst_per_ip: default_connection_burst_per_ip(),
        }
    }
}
