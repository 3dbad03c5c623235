//! Read error classification.

use onyx_proto::ProtocolError;

/// How a failed read is reported before the connection closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// Client sent a frame over the configured limit.
    FrameTooLong,
    /// Client sent bytes that are not UTF-8.
    InvalidEncoding,
    /// The socket broke; nothing the client did wrong.
    IoError,
}

impl ReadErrorAction {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::FrameTooLong => "frame_too_long",
            Self::InvalidEncoding => "invalid_utf8",
            Self::IoError => "io",
        }
    }

    /// Protocol violations are the client's fault and worth a warning.
    pub(super) fn is_violation(self) -> bool {
        !matches!(self, Self::IoError)
    }
}

pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::FrameTooLong { .. } => ReadErrorAction::FrameTooLong,
        ProtocolError::InvalidUtf8 { .. } => ReadErrorAction::InvalidEncoding,
        ProtocolError::Io(_) => ReadErrorAction::IoError,
        _ => ReadErrorAction::IoError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_are_violations() {
        let too_long = ProtocolError::FrameTooLong {
            actual: 2048,
            limit: 1024,
        };
        let action = classify_read_error(&too_long);
        assert_eq!(action, ReadErrorAction::FrameTooLong);
        assert!(action.is_violation());

        let bad = ProtocolError::InvalidUtf8 { byte_pos: 3 };
        assert_eq!(classify_read_error(&bad).label(), "invalid_utf8");
    }

    #[test]
    fn io_errors_are_not_violations() {
        let io = ProtocolError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset));
        let action = classify_read_error(&io);
        assert_eq!(action, ReadErrorAction::IoError);
        assert!(!action.is_violation());
    }
}
