//! onyxd - Onyx game server daemon
//!
//! Serves one role of the login/world split: authenticates players over the
//! markup handshake, then routes their delimited game packets to handlers.

mod config;
mod db;
mod error;
mod handlers;
mod http;
mod metrics;
mod network;
mod security;
mod services;
mod state;
mod telemetry;

use crate::config::Config;
use crate::db::Database;
use crate::handlers::{Dispatcher, HandshakeTable};
use crate::network::Gateway;
use crate::security::{ConnectionRateLimiter, SessionGuard, SystemClock, ThrottleRegistry};
use crate::services::{ServerInfo, Services, StoreAuthenticator};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        server = %config.server.name,
        id = config.server.id,
        kind = config.server.kind.as_str(),
        "Starting onyxd"
    );

    let db = Database::new(&config.database.path).await?;
    info!(path = %config.database.path, "Player store ready");

    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    match config.server.metrics_port {
        Some(port) if port != 0 => {
            metrics::init();
            tokio::spawn(async move {
                http::run_http_server(port).await;
            });
            info!(port, "Prometheus HTTP server started");
        }
        _ => info!("Metrics disabled"),
    }

    let clock = Arc::new(SystemClock);
    let store = Arc::new(db.clone());
    let authenticator = Arc::new(StoreAuthenticator::new(
        store.clone(),
        config.server.kind,
        clock.clone(),
    ));
    let services = Arc::new(Services::new(
        ServerInfo::from(&config.server),
        store,
        authenticator,
    ));

    let dispatcher = Dispatcher::new(
        HandshakeTable::new(),
        handlers::world::default_table(config.server.kind),
        SessionGuard::from_config(&config.security),
        ThrottleRegistry::from_config(&config.throttle),
        clock,
    );
    let unresolved = dispatcher.unresolved_keys();
    info!(
        handlers = dispatcher.game_table().len(),
        unresolved = unresolved.len(),
        "Handler table built"
    );
    let dispatcher = Arc::new(dispatcher);

    // Rate limiter entries are keyed by IP and grow unbounded without pruning.
    let rate_limiter = Arc::new(ConnectionRateLimiter::new(
        config.security.connection_burst_per_ip,
    ));
    {
        let rate_limiter = Arc::clone(&rate_limiter);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                rate_limiter.cleanup();
            }
        });
    }

    let gateway = Gateway::bind(
        config.listen.address,
        dispatcher,
        services,
        config.limits.clone(),
        rate_limiter,
    )
    .await?;
    info!(addr = %gateway.local_addr()?, "Accepting connections");

    gateway.run().await?;

    Ok(())
}
