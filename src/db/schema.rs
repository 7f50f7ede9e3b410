/// Idempotent startup schema
///
/// The schema is created with `CREATE TABLE IF NOT EXISTS` every time the
/// process starts; a populated database passes through unchanged.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE,
///     role TEXT NOT NULL DEFAULT 'common',
///     password_hash TEXT NOT NULL,
///     created_at TEXT NOT NULL
/// );
///
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
///     title TEXT NOT NULL,
///     description TEXT,
///     priority INTEGER NOT NULL DEFAULT 1,
///     due_date TEXT,
///     completed INTEGER NOT NULL DEFAULT 0,
///     created_at TEXT NOT NULL
/// );
///
/// CREATE TABLE sessions (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash TEXT NOT NULL UNIQUE,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// Deleting a user nullifies the owner of their tasks; the tasks survive and
/// remain visible to masters only. Deleting a user removes their sessions.

use sqlx::SqlitePool;
use tracing::debug;

/// Creates all tables if they do not exist yet
///
/// # Errors
///
/// Returns an error if a DDL statement fails to execute.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'common',
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT,
            priority INTEGER NOT NULL DEFAULT 1,
            due_date TEXT,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token_hash TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    debug!("schema initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::pool::create_pool;

    async fn test_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        create_pool(&config).await.expect("pool should connect")
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let pool = test_pool().await;

        init(&pool).await.expect("first init should succeed");
        init(&pool).await.expect("second init should succeed");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .expect("users table should exist");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_email_uniqueness_enforced() {
        let pool = test_pool().await;
        init(&pool).await.unwrap();

        let insert = "INSERT INTO users (name, email, role, password_hash, created_at)
                      VALUES (?, ?, 'common', 'x', '2024-01-01T00:00:00Z')";

        sqlx::query(insert)
            .bind("A")
            .bind("dup@example.com")
            .execute(&pool)
            .await
            .expect("first insert should succeed");

        let err = sqlx::query(insert)
            .bind("B")
            .bind("dup@example.com")
            .execute(&pool)
            .await
            .expect_err("duplicate email should be rejected");

        match err {
            sqlx::Error::Database(db_err) => {
                assert_eq!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
