/// Administrative user endpoints (master only)
///
/// # Endpoints
///
/// - `GET /admin` - list all users
/// - `GET /update_user/{id}` - target record for the edit form
/// - `POST /update_user/{id}` - update name, email and/or role
/// - `POST /delete_user/{id}` - delete another user
///
/// Self-protection applies on both GET and POST of the update path: a master
/// can never open or submit an edit against their own record, and can never
/// delete themselves.

use crate::{
    app::{AppState, AuthSession},
    auth::policy,
    error::{ApiError, ApiResult},
    models::user::{User, UserChanges},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

/// Administrative update request; only present fields are written
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New role string
    pub role: Option<String>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    /// ID of the deleted user
    pub deleted: i64,
}

/// Lists all user accounts
///
/// # Errors
///
/// - `403`: requester is not a master
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<Vec<User>>> {
    require_master(&auth)?;

    let users = User::list(&state.db).await?;

    Ok(Json(users))
}

/// Returns the target record for the edit form
pub async fn show_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<Json<User>> {
    let target = load_mutable_user(&state, &auth, id).await?;

    Ok(Json(target))
}

/// Updates another user's name, email and/or role
///
/// # Errors
///
/// - `403`: not a master, or the target is the requester's own account
/// - `404`: no such user
/// - `409`: the new email belongs to another account
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    load_mutable_user(&state, &auth, id).await?;

    let changes = UserChanges {
        name: normalize_text(req.name),
        email: normalize_text(req.email),
        role: normalize_text(req.role),
    };

    let user = User::update(&state.db, id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(target = id, master = auth.user.id, "user updated");

    Ok(Json(user))
}

/// Deletes another user
///
/// Their tasks survive with a nulled owner; their sessions end.
///
/// # Errors
///
/// - `403`: not a master, or the target is the requester's own account
/// - `404`: no such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeletedResponse>> {
    load_mutable_user(&state, &auth, id).await?;

    User::delete(&state.db, id).await?;

    tracing::info!(target = id, master = auth.user.id, "user deleted");

    Ok(Json(DeletedResponse { deleted: id }))
}

/// Rejects non-masters
fn require_master(auth: &AuthSession) -> Result<(), ApiError> {
    if !policy::can_administer_users(&auth.user) {
        return Err(ApiError::Forbidden("Master role required".to_string()));
    }

    Ok(())
}

/// Loads the target and applies the full administrative policy
///
/// Master check first (403), then existence (404), then self-protection
/// (403).
async fn load_mutable_user(
    state: &AppState,
    auth: &AuthSession,
    id: i64,
) -> Result<User, ApiError> {
    require_master(auth)?;

    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !policy::can_mutate_user(&auth.user, &target) {
        return Err(ApiError::Forbidden(
            "Masters cannot modify their own account".to_string(),
        ));
    }

    Ok(target)
}

/// Collapses empty text fields to None
fn normalize_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
