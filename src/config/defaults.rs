//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_metrics_port() -> Option<u16> {
    Some(9090)
}

pub fn default_database_path() -> String {
    "onyx.db".to_string()
}

// =============================================================================
// Limits Defaults
// =============================================================================

pub fn default_max_connections() -> usize {
    256
}

pub fn default_max_packet_len() -> usize {
    1024
}

pub fn default_outgoing_queue() -> usize {
    64
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_violation_code() -> u16 {
    800
}

pub fn default_reserved_char() -> char {
    '|'
}

pub fn default_allow_reserved() -> Vec<String> {
    vec!["g#ur".to_string(), "m#sm".to_string()]
}

pub fn default_connection_burst_per_ip() -> u32 {
    10
}

// =============================================================================
// Throttle Defaults
// =============================================================================

/// Cooldowns in seconds for avatar state updates.
pub const DEFAULT_COOLDOWNS: &[(&str, u64)] = &[
    ("u#sf", 2),
    ("u#sa", 3),
    ("u#sb", 2),
    ("u#se", 2),
    ("u#ss", 3),
    ("u#sj", 3),
    ("u#sg", 5),
];
