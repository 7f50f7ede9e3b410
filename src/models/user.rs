/// User model and database operations
///
/// A user has a display name, a unique email, a free-form role string and an
/// Argon2id password hash. The role doubles as the team grouping for task
/// visibility; the value `"master"` elevates.
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
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck::models::user::{NewUser, User};
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     NewUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         role: "common".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// User account record
///
/// The password hash never leaves the server: it is skipped on
/// serialization.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, unique across all users
    pub email: String,

    /// Free-form role string; `"master"` elevates, anything else is a team
    pub role: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role string (the registration flow passes the default role)
    pub role: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Input for the administrative user update
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New role string
    pub role: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database fails.
    pub async fn create(pool: &SqlitePool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, email, role, password_hash, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.role)
        .bind(data.password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies an administrative update
    ///
    /// Only the fields present in `changes` are written; the statement is
    /// built dynamically. With nothing to change the record is returned
    /// as-is.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the id doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if the new email belongs to another user or the
    /// database fails.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut assignments = Vec::new();
        if changes.name.is_some() {
            assignments.push("name = ?");
        }
        if changes.email.is_some() {
            assignments.push("email = ?");
        }
        if changes.role.is_some() {
            assignments.push("role = ?");
        }

        if assignments.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ? \
             RETURNING id, name, email, role, password_hash, created_at",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, User>(&query);
        if let Some(name) = changes.name {
            q = q.bind(name);
        }
        if let Some(email) = changes.email {
            q = q.bind(email);
        }
        if let Some(role) = changes.role {
            q = q.bind(role);
        }

        let user = q.bind(id).fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Their tasks survive with a nulled owner (schema-level `ON DELETE SET
    /// NULL`); their sessions are removed.
    ///
    /// # Returns
    ///
    /// True if a user was deleted, false if the id didn't exist
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
