//! Player repository.

use super::{PlayerId, PlayerRecord, StoreError};
use sqlx::SqlitePool;

type PlayerRow = (i64, String, String, Option<String>, i64, bool, Option<i64>);

fn into_record(row: PlayerRow) -> PlayerRecord {
    let (id, username, password, login_key, coins, banned, last_login) = row;
    PlayerRecord {
        id,
        username,
        password,
        login_key,
        coins,
        banned,
        last_login,
    }
}

/// Repository for player account operations.
pub struct PlayerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a player by username (case-insensitive).
    pub async fn find_by_name(&self, username: &str) -> Result<Option<PlayerRecord>, StoreError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, username, password, login_key, coins, banned, last_login
            FROM players
            WHERE username = ? COLLATE NOCASE
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(into_record))
    }

    pub async fn find_by_id(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT id, username, password, login_key, coins, banned, last_login
            FROM players
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(into_record))
    }

    pub async fn set_login_key(&self, id: PlayerId, key: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE players SET login_key = ? WHERE id = ?")
            .bind(key)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::PlayerNotFound(id));
        }
        Ok(())
    }

    pub async fn touch_login(&self, id: PlayerId, at: i64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE players SET last_login = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::PlayerNotFound(id));
        }
        Ok(())
    }

    /// Insert a player, returning its id.
    #[cfg(test)]
    pub async fn create(&self, username: &str, password: &str) -> Result<PlayerId, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO players (username, password, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password)
        .bind(chrono::Utc::now().timestamp())
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Set or clear the ban flag.
    #[cfg(test)]
    pub async fn set_banned(&self, id: PlayerId, banned: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE players SET banned = ? WHERE id = ?")
            .bind(banned)
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
