//! Prometheus metrics collection for onyxd.
//!
//! Provides observability via Prometheus metrics exposed on an HTTP
//! endpoint. Tracks inbound traffic per protocol, command dispatch
//! outcomes, session guard enforcement and connection admission.
//!
//! ## Dispatch Metrics
//!
//! - `onyx_packets_total{protocol}` - Raw messages by parse path
//! - `onyx_command_total{command}` - Resolved game commands by key
//! - `onyx_command_duration_seconds{command}` - Handler latency histogram
//! - `onyx_throttled_total{command}` - Commands dropped by cooldown
//! - `onyx_guard_violations_total{reason}` - Guard disconnects

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Raw inbound messages by parse path (policy, handshake, game).
pub static PACKETS_RECEIVED: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages dropped because they did not parse.
pub static MALFORMED_PACKETS: OnceLock<IntCounterVec> = OnceLock::new();

/// Game commands with no handler in any layer.
pub static UNHANDLED_COMMANDS: OnceLock<IntCounter> = OnceLock::new();

/// Game commands dropped by the per-session cooldown.
pub static THROTTLED: OnceLock<IntCounterVec> = OnceLock::new();

/// Session guard rejections by reason.
pub static GUARD_VIOLATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Connections closed before a session was created.
pub static CONNECTIONS_REJECTED: OnceLock<IntCounterVec> = OnceLock::new();

/// Login attempts by outcome.
pub static LOGINS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Currently open client connections.
pub static CONNECTED_CLIENTS: OnceLock<IntGauge> = OnceLock::new();

/// Authenticated players registered in the world index.
pub static ONLINE_PLAYERS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Command Metrics
// ========================================================================

/// Commands dispatched by key.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler latency by key.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Handler errors by key and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(PACKETS_RECEIVED, IntCounterVec::new(Opts::new("onyx_packets_total", "Inbound messages by protocol"), &["protocol"]));
    register!(MALFORMED_PACKETS, IntCounterVec::new(Opts::new("onyx_malformed_packets_total", "Inbound messages that failed to parse"), &["protocol"]));
    register!(UNHANDLED_COMMANDS, IntCounter::new("onyx_unhandled_commands_total", "Game commands without a handler"));
    register!(THROTTLED, IntCounterVec::new(Opts::new("onyx_throttled_total", "Game commands dropped by cooldown"), &["command"]));
    register!(GUARD_VIOLATIONS, IntCounterVec::new(Opts::new("onyx_guard_violations_total", "Session guard disconnects"), &["reason"]));
    register!(CONNECTIONS_REJECTED, IntCounterVec::new(Opts::new("onyx_connections_rejected_total", "Connections refused at accept"), &["reason"]));
    register!(LOGINS, IntCounterVec::new(Opts::new("onyx_logins_total", "Login attempts by outcome"), &["result"]));
    register!(CONNECTED_CLIENTS, IntGauge::new("onyx_connected_clients", "Currently open client connections"));
    register!(ONLINE_PLAYERS, IntGauge::new("onyx_online_players", "Authenticated players online"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("onyx_command_total", "Game commands dispatched by key"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("onyx_command_duration_seconds", "Game command latency by key")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("onyx_command_errors_total", "Game command errors by key"), &["command", "error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

fn inc_labeled(metric: &OnceLock<IntCounterVec>, labels: &[&str]) {
    if let Some(c) = metric.get() {
        c.with_label_values(labels).inc();
    }
}

/// Record a raw inbound message.
#[inline]
pub fn record_packet(protocol: &str) {
    inc_labeled(&PACKETS_RECEIVED, &[protocol]);
}

#[inline]
pub fn record_malformed(protocol: &str) {
    inc_labeled(&MALFORMED_PACKETS, &[protocol]);
}

#[inline]
pub fn record_unhandled() {
    if let Some(c) = UNHANDLED_COMMANDS.get() {
        c.inc();
    }
}

#[inline]
pub fn record_throttled(command: &str) {
    inc_labeled(&THROTTLED, &[command]);
}

#[inline]
pub fn record_guard_violation(reason: &str) {
    inc_labeled(&GUARD_VIOLATIONS, &[reason]);
}

#[inline]
pub fn record_rejected_connection(reason: &str) {
    inc_labeled(&CONNECTIONS_REJECTED, &[reason]);
}

#[inline]
pub fn record_login(result: &str) {
    inc_labeled(&LOGINS, &[result]);
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    inc_labeled(&COMMAND_COUNTER, &[command]);
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    inc_labeled(&COMMAND_ERRORS, &[command, error]);
}

pub fn client_connected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.inc();
    }
}

pub fn client_disconnected() {
    if let Some(g) = CONNECTED_CLIENTS.get() {
        g.dec();
    }
}

pub fn set_online_players(count: usize) {
    if let Some(g) = ONLINE_PLAYERS.get() {
        g.set(count as i64);
    }
}
