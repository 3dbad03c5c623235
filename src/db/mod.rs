//! Database module for persistent storage.
//!
//! Provides async SQLite database access using SQLx for player accounts.
//! Handlers and the authenticator only see the [`PlayerStore`] trait, so the
//! dispatch core never depends on SQLite directly.

mod players;

pub use players::PlayerRepository;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Numeric player identifier.
pub type PlayerId = i64;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("integrity check failed: {0}")]
    Integrity(String),
    #[error("player not found: {0}")]
    PlayerNotFound(PlayerId),
}

/// A stored player account.
#[derive(Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub username: String,
    /// Client-side password digest (hex).
    pub password: String,
    /// Key issued by the login server for the next world login.
    pub login_key: Option<String>,
    pub coins: i64,
    pub banned: bool,
    pub last_login: Option<i64>,
}

impl std::fmt::Debug for PlayerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("coins", &self.coins)
            .field("banned", &self.banned)
            .field("last_login", &self.last_login)
            .finish_non_exhaustive()
    }
}

/// Async lookups used by the authenticator and world handlers.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    async fn player_by_name(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError>;

    async fn player_by_id(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError>;

    /// Replace the player's login key.
    async fn set_login_key(&self, id: PlayerId, key: &str) -> Result<(), StoreError>;

    /// Record a successful login at `at` (unix seconds).
    async fn touch_login(&self, id: PlayerId, at: i64) -> Result<(), StoreError>;
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new database connection, running migrations if needed.
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let pool = if path == ":memory:" {
            // Uniquely named shared-cache database per call; a plain
            // `:memory:` would give every pooled connection its own database.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:onyx-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&pool)
            .await?;

        let integrity_result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&pool)
            .await?;

        if integrity_result != "ok" {
            tracing::error!(
                integrity_check = %integrity_result,
                "Database integrity check FAILED - corruption detected!"
            );
            return Err(StoreError::Integrity(integrity_result));
        }

        info!("Database integrity check passed");

        Ok(Self { pool })
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;

        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get player repository.
    pub fn players(&self) -> PlayerRepository<'_> {
        PlayerRepository::new(&self.pool)
    }
}

#[async_trait]
impl PlayerStore for Database {
    async fn player_by_name(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError> {
        self.players().find_by_name(username).await
    }

    async fn player_by_id(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        self.players().find_by_id(id).await
    }

    async fn set_login_key(&self, id: PlayerId, key: &str) -> Result<(), StoreError> {
        self.players().set_login_key(id, key).await
    }

    async fn touch_login(&self, id: PlayerId, at: i64) -> Result<(), StoreError> {
        self.players().touch_login(id, at).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_databases_are_isolated() {
        let a = Database::new(":memory:").await.unwrap();
        let b = Database::new(":memory:").await.unwrap();

        a.players().create("Rocky", "hash").await.unwrap();
        assert!(a.player_by_name("Rocky").await.unwrap().is_some());
        assert!(b.player_by_name("Rocky").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("onyx.db");
        let path = path.to_string_lossy().to_string();

        let id = {
            let db = Database::new(&path).await.unwrap();
            db.players().create("Rocky", "hash").await.unwrap()
        };

        let db = Database::new(&path).await.unwrap();
        let player = db.player_by_id(id).await.unwrap().unwrap();
        assert_eq!(player.username, "Rocky");
    }

    #[test]
    fn record_debug_hides_secrets() {
        let record = PlayerRecord {
            id: 1,
            username: "Rocky".into(),
            password: "secret-digest".into(),
            login_key: Some("secret-key".into()),
            coins: 0,
            banned: false,
            last_login: None,
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("Rocky"));
    }
}
