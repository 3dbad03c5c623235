//! Inbound message pipeline.
//!
//! ```text
//! raw ─▶ classify ─┬─ policy probe ─▶ fixed reply
//!                  ├─ handshake ─▶ parse ─▶ bootstrap handler
//!                  └─ game ─▶ parse ─▶ guard ─▶ throttle ─▶ resolve ─▶ handler
//! ```
//!
//! Only a guard violation or a fatal handler error asks the connection to
//! close. Malformed input, throttled commands and unresolved commands are
//! dropped with at most a log entry.

use super::context::Context;
use super::registry::{HandlerTable, HandshakeTable};
use crate::error::HandlerError;
use crate::security::{Clock, SessionGuard, ThrottleDecision, ThrottleRegistry};
use crate::telemetry::{CommandTimer, spans};
use onyx_proto::{GamePacket, HandshakeMessage, Inbound, POLICY_RESPONSE, classify};
use std::sync::Arc;
use tracing::{Instrument, debug, warn};

/// What the connection should do after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Continue,
    /// Flush queued replies, then close.
    Disconnect,
}

/// Routes inbound messages. Shared read-only by every connection.
pub struct Dispatcher {
    handshake: HandshakeTable,
    game: HandlerTable,
    guard: SessionGuard,
    throttle: ThrottleRegistry,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(
        handshake: HandshakeTable,
        game: HandlerTable,
        guard: SessionGuard,
        throttle: ThrottleRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            handshake,
            game,
            guard,
            throttle,
            clock,
        }
    }

    pub fn game_table(&self) -> &HandlerTable {
        &self.game
    }

    /// Throttled and allow-listed keys that no handler resolves.
    ///
    /// Called once at startup; each key is logged as a warning.
    pub fn unresolved_keys(&self) -> Vec<&str> {
        let missing = self
            .game
            .missing(self.throttle.keys().chain(self.guard.allow_list()));
        for key in &missing {
            warn!(command = %key, "Configured command has no handler");
        }
        missing
    }

    /// Process one raw message.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, raw: &str) -> DispatchOutcome {
        let inbound = classify(raw);
        crate::metrics::record_packet(inbound.label());
        debug!(protocol = inbound.label(), len = raw.len(), "Inbound");

        match inbound {
            Inbound::PolicyRequest => {
                if let Err(e) = ctx.sender.send(POLICY_RESPONSE).await {
                    return outcome_for(&e);
                }
                DispatchOutcome::Continue
            }
            Inbound::Handshake(raw) => self.dispatch_handshake(ctx, raw).await,
            Inbound::Game(raw) => self.dispatch_game(ctx, raw).await,
        }
    }

    async fn dispatch_handshake(&self, ctx: &mut Context<'_>, raw: &str) -> DispatchOutcome {
        let msg = match HandshakeMessage::parse(raw) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "Malformed handshake dropped");
                crate::metrics::record_malformed("handshake");
                return DispatchOutcome::Continue;
            }
        };
        ctx.session.enter_handshake();

        let Some(handler) = self.handshake.get(&msg.action) else {
            debug!(action = msg.action.as_str(), "Unmapped handshake action ignored");
            return DispatchOutcome::Continue;
        };

        let action = msg.action.as_str();
        let _timer = CommandTimer::new(action);
        match handler.handle(ctx, &msg).await {
            Ok(()) => DispatchOutcome::Continue,
            Err(e) => {
                crate::metrics::record_command_error(action, e.error_code());
                debug!(action = %action, error = %e, "Handshake handler error");
                outcome_for(&e)
            }
        }
    }

    async fn dispatch_game(&self, ctx: &mut Context<'_>, raw: &str) -> DispatchOutcome {
        debug!(raw = %raw, "Game packet");
        let packet = match GamePacket::parse(raw) {
            Ok(packet) => packet,
            Err(e) => {
                debug!(error = %e, "Malformed game packet dropped");
                crate::metrics::record_malformed("game");
                return DispatchOutcome::Continue;
            }
        };

        if let Err(violation) = self.guard.check(ctx.session, &packet) {
            warn!(
                player = ?ctx.session.id(),
                zone = %packet.zone,
                reason = violation.reason(),
                "Guard violation: {violation}"
            );
            crate::metrics::record_guard_violation(violation.reason());
            if let Err(e) = ctx.sender.send_error(self.guard.violation_code()).await {
                debug!(error = %e, "Could not send violation code");
            }
            return DispatchOutcome::Disconnect;
        }

        let key = &packet.command;
        if let ThrottleDecision::Throttled { retry_at } =
            self.throttle.check(ctx.session, key, self.clock.now())
        {
            debug!(command = %key, retry_at, "Throttled command dropped");
            crate::metrics::record_throttled(key.as_str());
            return DispatchOutcome::Continue;
        }

        let Some(resolved) = self.game.resolve(key) else {
            warn!(command = %key, "Missing handler");
            crate::metrics::record_unhandled();
            return DispatchOutcome::Continue;
        };

        let span = spans::command(key.as_str(), ctx.session.id());
        let _timer = CommandTimer::new(key.as_str());
        let result = resolved
            .handler
            .handle(ctx, &packet)
            .instrument(span)
            .await;

        match result {
            Ok(()) => DispatchOutcome::Continue,
            Err(e) => {
                crate::metrics::record_command_error(key.as_str(), e.error_code());
                debug!(command = %key, layer = resolved.layer.as_str(), error = %e, "Command error");
                outcome_for(&e)
            }
        }
    }
}

fn outcome_for(error: &HandlerError) -> DispatchOutcome {
    if error.is_fatal() {
        DispatchOutcome::Disconnect
    } else {
        DispatchOutcome::Continue
    }
}
