//! Error types for the Onyx protocol library.
//!
//! Framing errors ([`ProtocolError`]) come from the codec and end the
//! connection. Parse errors ([`HandshakeError`], [`PacketError`]) describe a
//! single message and are never fatal on their own.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Stream-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame exceeded the configured maximum length.
    #[error("frame too long: {actual} bytes (limit: {limit})")]
    FrameTooLong {
        /// Bytes buffered when the limit was hit.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// A frame was not valid UTF-8.
    #[error("invalid UTF-8 in frame at byte {byte_pos}")]
    InvalidUtf8 {
        /// Byte position where validation failed.
        byte_pos: usize,
    },
}

/// Failures while reading a handshake document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// The document is not well-formed markup.
    #[error("malformed markup near {0:?}")]
    Malformed(String),

    /// A required element is absent.
    #[error("missing <{0}> element")]
    MissingElement(&'static str),

    /// A required attribute is absent.
    #[error("missing {0:?} attribute")]
    MissingAttribute(&'static str),
}

/// Failures while splitting a game packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Fewer tokens than envelope + command.
    #[error("packet has no command token: {0:?}")]
    MissingCommand(String),

    /// The command token is present but empty.
    #[error("packet has an empty command token: {0:?}")]
    EmptyCommand(String),
}
