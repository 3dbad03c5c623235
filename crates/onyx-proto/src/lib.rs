//! # onyx-proto
//!
//! Protocol layer for the Onyx game server. Clients speak two wire formats
//! over the same NUL-delimited stream:
//!
//! - a markup handshake (`<msg t="sys"><body action="verChk" r="0">...`)
//!   used before authentication, and
//! - a delimited game protocol (`%xt%s%u#sf%1%`) used for everything after.
//!
//! ## Features
//!
//! - One-shot classification of raw input ([`classify`])
//! - A small nom-based markup parser for the handshake ([`markup`], [`handshake`])
//! - Game packet tokenization into envelope, [`CommandKey`] and arguments ([`packet`])
//! - Reply builders for both formats ([`reply`])
//! - Optional Tokio codec for NUL-framed streams ([`codec`])
//!
//! ## Quick Start
//!
//! ```rust
//! use onyx_proto::{classify, GamePacket, Inbound};
//!
//! match classify("%xt%s%u#sf%1%") {
//!     Inbound::Game(raw) => {
//!         let packet = GamePacket::parse(raw).expect("valid packet");
//!         assert_eq!(packet.command.as_str(), "u#sf");
//!         assert_eq!(packet.command.namespace(), Some("u"));
//!         assert_eq!(packet.args, vec!["1"]);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod classify;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod error;
pub mod handshake;
pub mod markup;
pub mod packet;
pub mod reply;

pub use self::classify::{classify, Inbound, MARKUP_OPEN, POLICY_REQUEST, POLICY_RESPONSE};
#[cfg(feature = "tokio")]
pub use self::codec::PacketCodec;
pub use self::error::{HandshakeError, PacketError, ProtocolError};
pub use self::handshake::{Credentials, HandshakeAction, HandshakeMessage};
pub use self::markup::{Element, Node};
pub use self::packet::{CommandKey, GamePacket, COMMAND_DELIMITER, PACKET_DELIMITER};
pub use self::reply::{SysReply, XtReply};
