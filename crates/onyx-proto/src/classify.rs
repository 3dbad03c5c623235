//! Inbound message classification.
//!
//! Every raw message is classified exactly once. The legacy cross-domain
//! policy probe is intercepted first and never reaches either parser.

/// Character that opens a markup tag; handshake messages start with it.
pub const MARKUP_OPEN: char = '<';

/// Policy probe sent by legacy plugin runtimes before any real traffic.
pub const POLICY_REQUEST: &str = "<policy-file-request/>";

/// Fixed answer to [`POLICY_REQUEST`]. Clients compare it byte for byte.
pub const POLICY_RESPONSE: &str =
    "<cross-domain-policy><allow-access-from domain=\"*\" to-ports=\"*\" /></cross-domain-policy>";

/// The parse path selected for a raw message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// The cross-domain policy probe.
    PolicyRequest,
    /// A markup handshake document.
    Handshake(&'a str),
    /// A delimited game packet.
    Game(&'a str),
}

impl Inbound<'_> {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PolicyRequest => "policy",
            Self::Handshake(_) => "handshake",
            Self::Game(_) => "game",
        }
    }
}

/// Classify a raw message.
///
/// Anything that does not start with [`MARKUP_OPEN`] is a game packet,
/// including the empty string.
pub fn classify(raw: &str) -> Inbound<'_> {
    if raw == POLICY_REQUEST {
        Inbound::PolicyRequest
    } else if raw.starts_with(MARKUP_OPEN) {
        Inbound::Handshake(raw)
    } else {
        Inbound::Game(raw)
    }
}
