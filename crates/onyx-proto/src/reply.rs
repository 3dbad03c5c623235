//! Outbound reply builders.
//!
//! Replies are plain strings; the codec adds the frame terminator.

use std::fmt;

use crate::packet::PACKET_DELIMITER;

/// A system reply in handshake markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysReply {
    action: &'static str,
    room: i32,
    inner: String,
}

impl SysReply {
    /// Version check accepted.
    pub fn api_ok() -> Self {
        Self {
            action: "apiOK",
            room: 0,
            inner: String::new(),
        }
    }

    /// Random key issued to the client.
    pub fn random_key(key: &str) -> Self {
        Self {
            action: "rndK",
            room: -1,
            inner: format!("<k>{key}</k>"),
        }
    }
}

impl fmt::Display for SysReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<msg t=\"sys\"><body action=\"{}\" r=\"{}\">{}</body></msg>",
            self.action, self.room, self.inner
        )
    }
}

/// A game protocol reply: `%xt%{command}%{room}%{payload...}%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XtReply {
    command: String,
    room: i32,
    payload: Vec<String>,
}

impl XtReply {
    /// Reply tagged with `command` for `room` (`-1` for none).
    pub fn new(command: impl Into<String>, room: i32) -> Self {
        Self {
            command: command.into(),
            room,
            payload: Vec::new(),
        }
    }

    /// Error reply carrying a numeric code.
    pub fn error(code: u16) -> Self {
        Self::new("e", -1).arg(code)
    }

    /// Append one payload token.
    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.payload.push(value.to_string());
        self
    }

    /// Append several payload tokens.
    pub fn with_payload<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: fmt::Display,
    {
        self.payload
            .extend(values.into_iter().map(|v| v.to_string()));
        self
    }
}

impl fmt::Display for XtReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = PACKET_DELIMITER;
        write!(f, "{d}xt{d}{}{d}{}{d}", self.command, self.room)?;
        for token in &self.payload {
            write!(f, "{token}{d}")?;
        }
        Ok(())
    }
}
