/// Session model and database operations
///
/// A session binds the SHA-256 hash of an opaque bearer token to a user.
/// Login inserts a row, the auth middleware resolves the token to a loaded
/// user, logout deletes the row. Deleting a user cascades to their sessions.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash TEXT NOT NULL UNIQUE,
///     created_at TEXT NOT NULL
/// );
/// ```

use crate::models::user::User;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Session record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: i64,

    /// The logged-in user
    pub user_id: i64,

    /// SHA-256 hex of the bearer token
    pub token_hash: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for a user
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        token_hash: &str,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id, user_id, token_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Resolves a token hash to the session's user
    ///
    /// # Returns
    ///
    /// The loaded user if the session exists, None otherwise
    pub async fn find_user_by_token_hash(
        pool: &SqlitePool,
        token_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.password_hash, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a session by token hash (logout)
    ///
    /// # Returns
    ///
    /// True if a session was deleted, false if none matched
    pub async fn delete_by_token_hash(
        pool: &SqlitePool,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
