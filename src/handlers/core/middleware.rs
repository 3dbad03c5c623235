//! Outgoing message routing.
//!
//! Handlers never write to the socket. They push frames onto the
//! connection's outgoing queue through a [`ResponseSender`], which the
//! connection task drains.
//!
//! # Send Queue Overflow Protection
//!
//! When the outgoing queue is full (slow consumer), the send is abandoned
//! after [`SEND_TIMEOUT`] and the error is propagated so the connection is
//! closed. This prevents memory exhaustion from clients that don't read
//! their data.

use crate::error::HandlerError;
use crate::state::Liveness;
use onyx_proto::XtReply;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Timeout for attempting to send to a slow consumer before giving up.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Item on a connection's outgoing queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// One reply; the codec adds the frame terminator.
    Frame(String),
    /// Close the connection after flushing what was queued before it.
    Disconnect,
}

/// Cloneable handle to one connection's outgoing queue.
///
/// Every send checks the connection's [`Liveness`] first and is a silent
/// no-op once the connection is gone, so deferred handler tails can hold a
/// clone without caring whether the client is still there.
#[derive(Debug, Clone)]
pub struct ResponseSender {
    tx: mpsc::Sender<Outbound>,
    liveness: Liveness,
}

impl ResponseSender {
    pub fn new(tx: mpsc::Sender<Outbound>, liveness: Liveness) -> Self {
        Self { tx, liveness }
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Queue one reply.
    pub async fn send(&self, reply: impl Display) -> Result<(), HandlerError> {
        self.push(Outbound::Frame(reply.to_string())).await
    }

    /// Queue an `%xt%e%-1%{code}%` error reply.
    pub async fn send_error(&self, code: u16) -> Result<(), HandlerError> {
        self.send(XtReply::error(code)).await
    }

    /// Ask the connection to close after what is already queued.
    pub async fn disconnect(&self) -> Result<(), HandlerError> {
        self.push(Outbound::Disconnect).await
    }

    async fn push(&self, item: Outbound) -> Result<(), HandlerError> {
        if !self.is_alive() {
            return Ok(());
        }
        match tokio::time::timeout(SEND_TIMEOUT, self.tx.send(item)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_closed)) => Err(HandlerError::ConnectionClosed),
            Err(_timeout) => {
                warn!(
                    "Send queue overflow: client not reading (timeout after {:?})",
                    SEND_TIMEOUT
                );
                Err(HandlerError::SendQueueFull)
            }
        }
    }
}
