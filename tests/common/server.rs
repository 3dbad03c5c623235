//! Test server management.
//!
//! Spawns and manages onyxd instances for integration testing.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::process::{Child, Command};
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// A player row written before the server starts.
#[derive(Debug, Clone)]
pub struct SeedPlayer {
    pub username: &'static str,
    pub password: &'static str,
    pub login_key: Option<&'static str>,
    pub banned: bool,
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server of `kind` ("login" or "world") with the given players.
    pub async fn spawn(kind: &str, players: &[SeedPlayer]) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let db_path = data_dir.path().join("onyx.db");
        seed_players(&db_path, players).await?;

        let port = free_port()?;
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
id = 100
name = "Test"
kind = "{kind}"
metrics_port = 0

[listen]
address = "127.0.0.1:{port}"

[database]
path = "{}"

[security]
connection_burst_per_ip = 1000
"#,
            db_path.display()
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(env!("CARGO_BIN_EXE_onyxd"))
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };

        // Wait for server to start listening
        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

async fn seed_players(path: &Path, players: &[SeedPlayer]) -> anyhow::Result<()> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    for player in players {
        sqlx::query(
            "INSERT INTO players (username, password, login_key, banned, created_at) \
             VALUES (?, ?, ?, ?, 0)",
        )
        .bind(player.username)
        .bind(player.password)
        .bind(player.login_key)
        .bind(player.banned)
        .execute(&pool)
        .await?;
    }

    pool.close().await;
    Ok(())
}
