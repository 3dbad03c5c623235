//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds a socket and spawns a Connection task for each
//! incoming client, after the per-IP rate limit and the global connection
//! cap have let it through.

use crate::config::LimitsConfig;
use crate::handlers::Dispatcher;
use crate::network::Connection;
use crate::security::ConnectionRateLimiter;
use crate::services::Services;
use crate::state::ConnIdGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    services: Arc<Services>,
    limits: LimitsConfig,
    rate_limiter: Arc<ConnectionRateLimiter>,
    slots: Arc<Semaphore>,
    conn_ids: ConnIdGenerator,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        services: Arc<Services>,
        limits: LimitsConfig,
        rate_limiter: Arc<ConnectionRateLimiter>,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, kind = services.server.kind.as_str(), "Listener bound");

        Ok(Self {
            listener,
            dispatcher,
            services,
            slots: Arc::new(Semaphore::new(limits.max_connections)),
            limits,
            rate_limiter,
            conn_ids: ConnIdGenerator::new(),
        })
    }

    /// Address actually bound (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    if !self.rate_limiter.check_connection_rate(addr.ip()) {
                        warn!(%addr, "Connection rate limit exceeded - rejecting");
                        crate::metrics::record_rejected_connection("rate_limit");
                        drop(stream);
                        continue;
                    }

                    let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
                        warn!(%addr, limit = self.limits.max_connections, "Server full - rejecting");
                        crate::metrics::record_rejected_connection("capacity");
                        drop(stream);
                        continue;
                    };

                    if let Err(e) = stream.set_nodelay(true) {
                        debug!(%addr, error = %e, "Failed to set TCP_NODELAY");
                    }

                    let conn_id = self.conn_ids.next();
                    info!(%addr, conn_id, "Connection accepted");

                    let connection = Connection::new(
                        conn_id,
                        stream,
                        addr,
                        Arc::clone(&self.dispatcher),
                        Arc::clone(&self.services),
                        &self.limits,
                    );

                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(e) = connection.run().await {
                            error!(conn_id, %addr, error = %e, "Connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
