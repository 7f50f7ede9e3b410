/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /register` - create an account with the default role
/// - `POST /login` - verify credentials, mint a session token
/// - `GET /logout` - delete the current session
///
/// Login failure is deliberately uninformative: an unknown email and a wrong
/// password produce the byte-identical response, so the endpoint cannot be
/// used to enumerate accounts.

use crate::{
    app::{AppState, AuthSession},
    auth::{password, policy, token},
    error::{ApiError, ApiResult},
    models::{
        session::Session,
        user::{NewUser, User},
    },
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// The single generic login failure message (non-enumerability)
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Register request
///
/// All fields are required; they are optional here so a missing field
/// surfaces as one combined validation message instead of a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Plaintext password, hashed before storage
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque bearer token for subsequent requests
    pub token: String,

    /// User ID
    pub user_id: i64,

    /// Display name
    pub name: String,

    /// Role string
    pub role: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true; the session is gone either way
    pub logged_out: bool,
}

/// Registers a new account
///
/// Name, email and password are all required; any missing field rejects the
/// whole request with a single combined message and nothing is created. The
/// role always defaults to `"common"`; elevation is a master-only operation.
///
/// # Errors
///
/// - `422`: a required field is missing or the email is malformed
/// - `409`: the email is already registered (first account left intact)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<User>> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let plaintext = req.password.as_deref().unwrap_or_default();

    if name.is_empty() || email.is_empty() || plaintext.is_empty() {
        return Err(ApiError::validation(
            "form",
            "name, email and password are all required",
        ));
    }

    if !email.validate_email() {
        return Err(ApiError::validation("email", "Invalid email format"));
    }

    let password_hash = password::hash_password(plaintext)?;

    // A unique-constraint violation on the email converts to a 409 in the
    // sqlx error mapping; nothing is written in that case.
    let user = User::create(
        &state.db,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            role: policy::DEFAULT_ROLE.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "account registered");

    Ok(Json(user))
}

/// Authenticates a user and mints a session token
///
/// # Errors
///
/// - `401`: unknown email or wrong password, indistinguishable by design
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = User::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let (plaintext_token, token_hash) = token::generate_session_token();
    Session::create(&state.db, user.id, &token_hash).await?;

    tracing::info!(user_id = user.id, "login");

    Ok(Json(LoginResponse {
        token: plaintext_token,
        user_id: user.id,
        name: user.name,
        role: user.role,
    }))
}

/// Tears down the current session unconditionally
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<LogoutResponse>> {
    Session::delete_by_token_hash(&state.db, &auth.token_hash).await?;

    tracing::info!(user_id = auth.user.id, "logout");

    Ok(Json(LogoutResponse { logged_out: true }))
}
