/// Task endpoints
///
/// # Endpoints
///
/// - `GET /` - list tasks per the visibility policy, with optional filters
/// - `POST /create_task` - create a task owned by the requester
/// - `GET /task_detail/{id}` - one task, 404 if absent
/// - `GET /update_task/{id}` - current record for form prefill
/// - `POST /update_task/{id}` - overwrite the task's fields
/// - `POST /delete_task/{id}` - delete the task
///
/// Mutations are gated by `can_mutate_task` (owner or master). A missing id
/// is always a 404 before any authorization check, so probing cannot tell
/// "absent" from "forbidden" the wrong way round.
///
/// Priority and due date arrive as free text and are parsed here; a value
/// that doesn't parse rejects the whole request and nothing is written.

use crate::{
    app::{AppState, AuthSession},
    auth::policy::{self, TaskFilter},
    error::{ApiError, ApiResult},
    models::task::{NewTask, Task, TaskChanges},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Query parameters for the task list
///
/// Everything arrives as raw text; parsing rules differ per field (lenient
/// for completed, strict for priority and owner).
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Completed-state token, `"true"`/`"false"`
    pub completed: Option<String>,

    /// Priority equality
    pub priority: Option<String>,

    /// Owner-id equality
    pub owner: Option<String>,
}

/// Create request; priority and due date as free text
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Title (required)
    pub title: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Priority as text; absent means 1
    pub priority: Option<String>,

    /// Due date as `YYYY-MM-DD`; absent means none
    pub due_date: Option<String>,
}

/// Update request; overwrites the full field set
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title (required)
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority as text; absent means 1
    pub priority: Option<String>,

    /// New due date as `YYYY-MM-DD`
    pub due_date: Option<String>,

    /// Completed token, `"true"`/`"false"`; absent means false
    pub completed: Option<String>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    /// ID of the deleted record
    pub deleted: i64,
}

/// Lists the tasks visible to the requester
///
/// # Errors
///
/// - `422`: priority or owner filter present but not numeric
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = TaskFilter::from_params(
        params.completed.as_deref(),
        params.priority.as_deref(),
        params.owner.as_deref(),
    )?;

    let visibility = policy::visibility(&auth.user);
    let tasks = Task::list_visible(&state.db, &visibility, &filter).await?;

    Ok(Json(tasks))
}

/// Creates a task owned by the requester
///
/// # Errors
///
/// - `422`: missing title, non-numeric priority, or malformed due date;
///   nothing is written in any of these cases
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let title = require_title(req.title.as_deref())?;
    let priority = parse_priority(req.priority.as_deref())?;
    let due_date = parse_due_date(req.due_date.as_deref())?;

    let task = Task::create(
        &state.db,
        NewTask {
            user_id: Some(auth.user.id),
            title,
            description: normalize_text(req.description),
            priority,
            due_date,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, user_id = auth.user.id, "task created");

    Ok(Json(task))
}

/// Shows one task
pub async fn task_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Returns the current record for the update form
///
/// Gated like the update itself, so a user who cannot submit the form
/// cannot open it either.
pub async fn show_update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Task>> {
    let task = load_mutable_task(&state, &auth, id, "edit").await?;

    Ok(Json(task))
}

/// Overwrites a task's fields in place
///
/// # Errors
///
/// - `404`: no such task (takes precedence over the authorization check)
/// - `403`: requester is neither owner nor master
/// - `422`: a field fails to parse; the task is left untouched
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    load_mutable_task(&state, &auth, id, "edit").await?;

    let changes = TaskChanges {
        title: require_title(req.title.as_deref())?,
        description: normalize_text(req.description),
        priority: parse_priority(req.priority.as_deref())?,
        due_date: parse_due_date(req.due_date.as_deref())?,
        completed: parse_completed(req.completed.as_deref())?,
    };

    let task = Task::update(&state.db, id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = id, user_id = auth.user.id, "task updated");

    Ok(Json(task))
}

/// Deletes a task
///
/// # Errors
///
/// - `404`: no such task
/// - `403`: requester is neither owner nor master; the task survives
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeletedResponse>> {
    load_mutable_task(&state, &auth, id, "delete").await?;

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = id, user_id = auth.user.id, "task deleted");

    Ok(Json(DeletedResponse { deleted: id }))
}

/// Loads a task and checks the mutation policy: 404 first, then 403
async fn load_mutable_task(
    state: &AppState,
    auth: &AuthSession,
    id: i64,
    action: &str,
) -> Result<Task, ApiError> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !policy::can_mutate_task(&auth.user, &task) {
        return Err(ApiError::Forbidden(format!(
            "You cannot {} a task you do not own",
            action
        )));
    }

    Ok(task)
}

/// Requires a non-empty title
fn require_title(raw: Option<&str>) -> Result<String, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(title) => Ok(title.to_string()),
        None => Err(ApiError::validation("title", "title is required")),
    }
}

/// Parses the priority field; absent means 1, non-numeric rejects
fn parse_priority(raw: Option<&str>) -> Result<i64, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(1),
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| ApiError::validation("priority", "priority must be an integer")),
    }
}

/// Parses the due date field; absent means none, malformed rejects
///
/// Impossible calendar dates ("2024-02-30") fail the chrono parse and are
/// rejected like any other malformed value.
fn parse_due_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::validation("due_date", "due date must be a valid YYYY-MM-DD date")),
    }
}

/// Parses the completed token on update; absent means false
///
/// Unlike the list filter, an unrecognized token here is a validation error
/// rather than silently ignored.
fn parse_completed(raw: Option<&str>) -> Result<bool, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(false),
        Some(s) => policy::parse_bool_token(s)
            .ok_or_else(|| ApiError::validation("completed", "completed must be true or false")),
    }
}

/// Collapses empty text fields to None
fn normalize_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
