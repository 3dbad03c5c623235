//! Telemetry utilities for command timing and tracing spans.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: String,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(&self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, debug_span, info_span};

    /// Span for a client connection.
    pub fn connection(conn_id: u64, addr: SocketAddr) -> Span {
        info_span!("connection", conn = conn_id, addr = %addr)
    }

    /// Span for one dispatched game command.
    pub fn command(command: &str, player: Option<i64>) -> Span {
        debug_span!("game.command", command = %command, player = player)
    }
}
