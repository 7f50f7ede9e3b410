/// Common test utilities for integration tests
///
/// Builds the real router over an in-memory SQLite pool and provides small
/// helpers for driving it: register/login flows, task creation, and a
/// generic JSON request function.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use taskdeck::app::{build_router, AppState};
use taskdeck::auth::password::hash_password;
use taskdeck::config::{Config, DatabaseConfig, ServerConfig};
use taskdeck::db::{pool::create_pool, schema};
use taskdeck::models::user::{NewUser, User};
use tower::ServiceExt;

/// Test context: fresh in-memory database plus the assembled router
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        let db_config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };

        let db = create_pool(&db_config).await?;
        schema::init(&db).await?;

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: db_config,
            master: None,
        };

        let app = build_router(AppState::new(db.clone(), config));

        Ok(Self { db, app })
    }

    /// Sends a JSON request and returns (status, parsed body)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, body)
    }

    /// Registers an account through the API
    pub async fn register(&self, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/register",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    /// Logs in through the API and returns the session token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token in response").to_string()
    }

    /// Registers and logs in, returning the session token
    pub async fn register_and_login(&self, name: &str, email: &str, password: &str) -> String {
        let (status, body) = self.register(name, email, password).await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        self.login(email, password).await
    }

    /// Creates a master account directly in the database and logs it in
    ///
    /// Self-registration can never mint a master, so tests seed one the way
    /// the startup bootstrap would.
    pub async fn make_master(&self, email: &str, password: &str) -> String {
        User::create(
            &self.db,
            NewUser {
                name: "The Master".to_string(),
                email: email.to_string(),
                role: "master".to_string(),
                password_hash: hash_password(password).unwrap(),
            },
        )
        .await
        .unwrap();

        self.login(email, password).await
    }

    /// Creates a task through the API and returns its id
    pub async fn create_task(&self, token: &str, title: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/create_task",
                Some(token),
                Some(json!({ "title": title })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "create_task failed: {}", body);
        body["id"].as_i64().expect("task id in response")
    }

    /// Lists the tasks visible to a session
    pub async fn list_tasks(&self, token: &str) -> Vec<Value> {
        let (status, body) = self.request("GET", "/", Some(token), None).await;
        assert_eq!(status, StatusCode::OK, "list failed: {}", body);
        body.as_array().expect("task list").clone()
    }
}
