/// Database connection pool management
///
/// This module provides a SQLite connection pool using sqlx. The store is
/// file-based and configured by a single connection string; the database
/// file is created on first start.
///
/// # Example
///
/// ```no_run
/// use taskdeck::config::DatabaseConfig;
/// use taskdeck::db::pool::create_pool;
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = DatabaseConfig {
///     url: "sqlite://taskdeck.db".to_string(),
///     max_connections: 5,
/// };
/// let pool = create_pool(&config).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Creates and initializes a SQLite connection pool
///
/// Foreign key enforcement is switched on for every connection; SQLite
/// leaves it off by default and the tasks table relies on it.
///
/// # Errors
///
/// Returns an error if the connection string is malformed or the database
/// file cannot be opened or created.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    info!(url = %config.url, "database pool ready");

    Ok(pool)
}
