/// Task model and database operations
///
/// Tasks are the central record: a title, optional description, integer
/// priority, optional due date and a completed flag, owned by the user who
/// created them. Listing goes through the visibility policy: masters see
/// everything, everyone else sees their team's tasks.
///
/// # Schema
///
/// ```sql
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
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck::auth::policy::{TaskFilter, Visibility};
/// use taskdeck::models::task::{NewTask, Task};
/// # use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let task = Task::create(
///     &pool,
///     NewTask {
///         user_id: Some(1),
///         title: "buy milk".to_string(),
///         description: None,
///         priority: 1,
///         due_date: None,
///     },
/// )
/// .await?;
///
/// let visible = Task::list_visible(&pool, &Visibility::All, &TaskFilter::default()).await?;
/// assert!(visible.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use crate::auth::policy::{TaskFilter, Visibility};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// Task record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owning user; None once the owner account has been deleted
    pub user_id: Option<i64>,

    /// Short title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Integer priority, default 1, no enforced bounds
    pub priority: i64,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Owner (the authenticated creator)
    pub user_id: Option<i64>,

    /// Title, already validated non-empty
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority, already parsed (default 1)
    pub priority: i64,

    /// Due date, already parsed
    pub due_date: Option<NaiveDate>,
}

/// Full field set written by an update
///
/// An update overwrites all mutable fields in place; the owner and creation
/// timestamp never change.
#[derive(Debug, Clone)]
pub struct TaskChanges {
    /// New title
    pub title: String,

    /// New description
    pub description: Option<String>,

    /// New priority
    pub priority: i64,

    /// New due date
    pub due_date: Option<NaiveDate>,

    /// New completed flag
    pub completed: bool,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &SqlitePool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, priority, due_date, completed, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING id, user_id, title, description, priority, due_date, completed, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, priority, due_date, completed, created_at
            FROM tasks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks visible under a visibility, with optional filters
    ///
    /// Team visibility joins on the owner and compares the owner's role
    /// string; ownerless tasks only appear under `Visibility::All`. The
    /// filters compose with the visibility rule, they never widen it.
    pub async fn list_visible(
        pool: &SqlitePool,
        visibility: &Visibility,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT t.id, t.user_id, t.title, t.description, t.priority, \
             t.due_date, t.completed, t.created_at FROM tasks t",
        );

        let mut clauses: Vec<&str> = Vec::new();
        if matches!(visibility, Visibility::Team(_)) {
            query.push_str(" JOIN users u ON u.id = t.user_id");
            clauses.push("u.role = ?");
        }
        if filter.completed.is_some() {
            clauses.push("t.completed = ?");
        }
        if filter.priority.is_some() {
            clauses.push("t.priority = ?");
        }
        if filter.owner_id.is_some() {
            clauses.push("t.user_id = ?");
        }

        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }
        query.push_str(" ORDER BY t.created_at DESC, t.id DESC");

        let mut q = sqlx::query_as::<_, Task>(&query);
        if let Visibility::Team(role) = visibility {
            q = q.bind(role.clone());
        }
        if let Some(completed) = filter.completed {
            q = q.bind(completed);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(owner_id) = filter.owner_id {
            q = q.bind(owner_id);
        }

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Overwrites the mutable fields of a task
    ///
    /// # Returns
    ///
    /// The updated task if found, None if the id doesn't exist
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        changes: TaskChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, priority = ?, due_date = ?, completed = ?
            WHERE id = ?
            RETURNING id, user_id, title, description, priority, due_date, completed, created_at
            "#,
        )
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.priority)
        .bind(changes.due_date)
        .bind(changes.completed)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if the id didn't exist
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
