//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!    ┌──────────────────────────────────────────────┐
//!    │              Connection Task                 │
//!    │                                              │
//!    │  ┌──────────────┐        ┌───────────────┐   │
//!    │  │  FramedRead  │        │  FramedWrite  │   │
//!    │  └──────┬───────┘        └───────▲───────┘   │
//!    │         ▼                        │           │
//!    │    tokio::select! ◄──────────────┤           │
//!    │         │                        │           │
//!    │         ▼                        │           │
//!    │    [Dispatcher] ──────▶ [Outgoing Queue]     │
//!    └──────────────────────────────────────────────┘
//! ```
//!
//! Handlers never touch the socket. They push onto the outgoing queue, which
//! this task drains into the writer. Other tasks (deferred handler tails, a
//! newer login for the same player) reach the connection through the same
//! queue.

mod error_handling;

use error_handling::classify_read_error;

use crate::config::LimitsConfig;
use crate::handlers::{Context, DispatchOutcome, Dispatcher, Outbound, ResponseSender};
use crate::services::Services;
use crate::state::{Liveness, Session};
use crate::telemetry::spans;
use futures_util::{SinkExt, StreamExt};
use onyx_proto::PacketCodec;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, debug, info, warn};

type Writer = FramedWrite<OwnedWriteHalf, PacketCodec>;

/// A client connection handler.
pub struct Connection {
    conn_id: u64,
    addr: SocketAddr,
    stream: TcpStream,
    dispatcher: Arc<Dispatcher>,
    services: Arc<Services>,
    max_packet_len: usize,
    outgoing_queue: usize,
}

impl Connection {
    pub fn new(
        conn_id: u64,
        stream: TcpStream,
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        services: Arc<Services>,
        limits: &LimitsConfig,
    ) -> Self {
        Self {
            conn_id,
            addr,
            stream,
            dispatcher,
            services,
            max_packet_len: limits.max_packet_len,
            outgoing_queue: limits.outgoing_queue,
        }
    }

    /// Run the connection until the client leaves or is disconnected.
    pub async fn run(self) -> anyhow::Result<()> {
        let span = spans::connection(self.conn_id, self.addr);
        self.serve().instrument(span).await
    }

    async fn serve(self) -> anyhow::Result<()> {
        let (read_half, write_half) = self.stream.into_split();
        let mut reader = FramedRead::new(read_half, PacketCodec::with_max_len(self.max_packet_len));
        let mut writer = FramedWrite::new(write_half, PacketCodec::new());

        let liveness = Liveness::new();
        let mut session = Session::new(self.conn_id, self.addr, liveness.clone());
        let (tx, mut rx) = mpsc::channel(self.outgoing_queue);
        let sender = ResponseSender::new(tx, liveness.clone());

        crate::metrics::client_connected();
        debug!("Connection established");

        let result = loop {
            tokio::select! {
                frame = reader.next() => match frame {
                    Some(Ok(raw)) => {
                        let mut ctx = Context::new(&mut session, &sender, &self.services);
                        if self.dispatcher.dispatch(&mut ctx, &raw).await == DispatchOutcome::Disconnect {
                            break flush_pending(&mut writer, &mut rx).await;
                        }
                    }
                    Some(Err(e)) => {
                        let action = classify_read_error(&e);
                        if action.is_violation() {
                            warn!(error = %e, reason = action.label(), "Read error - closing");
                        } else {
                            debug!(error = %e, "Socket error");
                        }
                        break Ok(());
                    }
                    None => {
                        debug!("Client closed connection");
                        break Ok(());
                    }
                },
                Some(item) = rx.recv() => match item {
                    Outbound::Frame(frame) => {
                        if let Err(e) = writer.send(frame).await {
                            break Err(e.into());
                        }
                    }
                    Outbound::Disconnect => {
                        info!("Disconnected by server");
                        break Ok(());
                    }
                },
            }
        };

        // Deferred handler tails holding a sender clone become no-ops from here.
        liveness.kill();
        if let Some(id) = session.id()
            && self.services.world.unregister(id, self.conn_id)
        {
            debug!(player = id, "Player left world");
        }
        crate::metrics::client_disconnected();
        info!(phase = session.phase().as_str(), "Connection closed");

        result
    }
}

/// Write whatever is already queued, up to a disconnect marker.
async fn flush_pending(
    writer: &mut Writer,
    rx: &mut mpsc::Receiver<Outbound>,
) -> anyhow::Result<()> {
    while let Ok(item) = rx.try_recv() {
        match item {
            Outbound::Frame(frame) => writer.feed(frame).await?,
            Outbound::Disconnect => break,
        }
    }
    writer.flush().await?;
    Ok(())
}
