//! NUL-delimited frame codec for tokio.
//!
//! Both protocols share one stream in which every message, in either
//! direction, ends with a single `\0` byte.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};

/// Frame terminator.
pub const FRAME_TERMINATOR: u8 = 0;

/// Default maximum frame length in bytes, terminator excluded.
pub const DEFAULT_MAX_LEN: usize = 1024;

/// Codec splitting a byte stream into NUL-terminated UTF-8 frames.
#[derive(Debug, Clone)]
pub struct PacketCodec {
    /// Index of the next byte to scan for a terminator.
    next_index: usize,
    max_len: usize,
}

impl PacketCodec {
    /// Create a codec with [`DEFAULT_MAX_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Create a codec with a custom maximum frame length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// Maximum frame length accepted by the decoder.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for PacketCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        let Some(offset) = src[self.next_index..]
            .iter()
            .position(|b| *b == FRAME_TERMINATOR)
        else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                return Err(ProtocolError::FrameTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let mut frame = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;
        frame.truncate(frame.len() - 1);

        if frame.len() > self.max_len {
            return Err(ProtocolError::FrameTooLong {
                actual: frame.len(),
                limit: self.max_len,
            });
        }

        let text = std::str::from_utf8(&frame).map_err(|e| ProtocolError::InvalidUtf8 {
            byte_pos: e.valid_up_to(),
        })?;

        Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                // An unterminated tail at EOF is never a complete message.
                src.clear();
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(msg.len() + 1);
        dst.extend_from_slice(msg.as_bytes());
        dst.extend_from_slice(&[FRAME_TERMINATOR]);
        Ok(())
    }
}
