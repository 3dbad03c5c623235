//! Game packet tokenization.
//!
//! A game packet is a list of tokens joined by [`PACKET_DELIMITER`]:
//!
//! ```text
//! %xt%s%u#sf%1%
//!  |  | |    |
//!  |  | |    +-- arguments
//!  |  | +------- command token (namespace # action)
//!  |  +--------- zone
//!  +------------ kind
//! ```
//!
//! The first two tokens form the envelope. They are kept apart from the
//! arguments and never passed to handlers as positional data.

use std::fmt;

use crate::error::PacketError;

/// Separator between game packet tokens.
pub const PACKET_DELIMITER: char = '%';

/// Separator between namespace and action inside a command token.
pub const COMMAND_DELIMITER: char = '#';

/// Identifier of a game command, e.g. `u#sf`.
///
/// Case-sensitive. Used as-is as both throttle key and handler key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandKey {
    raw: String,
    separator: Option<usize>,
}

impl CommandKey {
    /// Split a command token at its first [`COMMAND_DELIMITER`].
    pub fn parse(token: &str) -> Self {
        Self {
            raw: token.to_string(),
            separator: token.find(COMMAND_DELIMITER),
        }
    }

    /// Build a namespaced key.
    pub fn namespaced(namespace: &str, action: &str) -> Self {
        Self {
            raw: format!("{namespace}{COMMAND_DELIMITER}{action}"),
            separator: Some(namespace.len()),
        }
    }

    /// Namespace, or `None` when the token has no separator.
    pub fn namespace(&self) -> Option<&str> {
        self.separator.map(|i| &self.raw[..i])
    }

    /// Action part; the whole token when there is no namespace.
    pub fn action(&self) -> &str {
        match self.separator {
            Some(i) => &self.raw[i + COMMAND_DELIMITER.len_utf8()..],
            None => &self.raw,
        }
    }

    /// The full key as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for CommandKey {
    fn from(token: &str) -> Self {
        Self::parse(token)
    }
}

/// A tokenized game packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePacket {
    /// First envelope token (`xt` for extension packets).
    pub kind: String,
    /// Second envelope token. Diagnostics only.
    pub zone: String,
    /// The command token.
    pub command: CommandKey,
    /// Remaining tokens, unchanged.
    pub args: Vec<String>,
}

impl GamePacket {
    /// Tokenize a raw game packet.
    ///
    /// One leading and one trailing delimiter are ignored, so framed
    /// (`%xt%s%u#h%1%`) and unframed (`xt%s%u#h%1`) input tokenize the same.
    pub fn parse(raw: &str) -> Result<Self, PacketError> {
        let body = raw.strip_prefix(PACKET_DELIMITER).unwrap_or(raw);
        let body = body.strip_suffix(PACKET_DELIMITER).unwrap_or(body);

        let mut tokens = body.split(PACKET_DELIMITER);
        let (Some(kind), Some(zone), Some(command)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(PacketError::MissingCommand(raw.to_string()));
        };
        if command.is_empty() {
            return Err(PacketError::EmptyCommand(raw.to_string()));
        }

        Ok(Self {
            kind: kind.to_string(),
            zone: zone.to_string(),
            command: CommandKey::parse(command),
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// Positional argument `n`.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.args.get(n).map(String::as_str)
    }

    /// Command token followed by every argument.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.command.as_str()).chain(self.args.iter().map(String::as_str))
    }
}
