/// Application state and router builder
///
/// This module defines the shared application state, the session
/// authentication middleware, and the function that assembles the Axum
/// router. Identity is never ambient: the middleware resolves the bearer
/// token to a loaded user once and hands it to handlers as an explicit
/// `AuthSession` value.
///
/// # Example
///
/// ```no_run
/// use taskdeck::{app::{build_router, AppState}, config::Config, db};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = db::pool::create_pool(&config.database).await?;
/// db::schema::init(&pool).await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    auth::token,
    config::Config,
    error::ApiError,
    models::{session::Session, user::User},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// The resolved identity of a request
///
/// Inserted into request extensions by the session middleware; handlers and
/// policy functions receive it explicitly instead of reading a global
/// current-user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The loaded user record
    pub user: User,

    /// Hash of the presented token, kept so logout can delete the session
    pub token_hash: String,
}

/// Builds the complete Axum router
///
/// # Routes
///
/// ```text
/// POST /register                 # public
/// POST /login                    # public
/// GET  /                         # session: list tasks + filters
/// POST /create_task              # session
/// GET  /task_detail/:id          # session
/// GET  /update_task/:id          # session + ownership/master
/// POST /update_task/:id          # session + ownership/master
/// POST /delete_task/:id          # session + ownership/master
/// GET  /logout                   # session
/// GET  /admin                    # master
/// GET  /update_user/:id          # master + not-self
/// POST /update_user/:id          # master + not-self
/// POST /delete_user/:id          # master + not-self
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes (no session)
    let public_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Everything else requires a session
    let protected_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/create_task", post(routes::tasks::create_task))
        .route("/task_detail/:id", get(routes::tasks::task_detail))
        .route(
            "/update_task/:id",
            get(routes::tasks::show_update_task).post(routes::tasks::update_task),
        )
        .route("/delete_task/:id", post(routes::tasks::delete_task))
        .route("/logout", get(routes::auth::logout))
        .route("/admin", get(routes::users::list_users))
        .route(
            "/update_user/:id",
            get(routes::users::show_user).post(routes::users::update_user),
        )
        .route("/delete_user/:id", post(routes::users::delete_user))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Session authentication middleware
///
/// Extracts the bearer token from the Authorization header, resolves its
/// hash against the sessions table, and injects the loaded user into request
/// extensions as an `AuthSession`.
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let token_hash = token::hash_session_token(token);

    let user = Session::find_user_by_token_hash(&state.db, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    req.extensions_mut().insert(AuthSession { user, token_hash });

    Ok(next.run(req).await)
}
