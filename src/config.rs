/// Configuration management
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct. The config is built once at startup and
/// passed by reference into every component; there is no ambient global
/// configuration anywhere in the crate.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite connection string (default: `sqlite://taskdeck.db`)
/// - `SERVER_HOST`: Host to bind to (default: 0.0.0.0)
/// - `SERVER_PORT`: Port to bind to (default: 8080)
/// - `MASTER_EMAIL` / `MASTER_PASSWORD` / `MASTER_NAME`: optional bootstrap
///   account with the `master` role, created at startup if absent
/// - `RUST_LOG`: Log level (default: info)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Optional master-account bootstrap
    ///
    /// Self-registration always yields the default role, so the first
    /// elevated account has to come from configuration.
    pub master: Option<MasterConfig>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g. `sqlite://taskdeck.db`)
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Bootstrap credentials for the initial master account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Plaintext password, hashed before storage
    pub password: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable has an invalid value
    /// (e.g. a non-numeric port).
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://taskdeck.db".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let master = match (env::var("MASTER_EMAIL"), env::var("MASTER_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(MasterConfig {
                name: env::var("MASTER_NAME").unwrap_or_else(|_| "Master".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            master,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
