//! # Taskdeck server
//!
//! Binary entry point: initializes tracing, loads configuration, prepares
//! the database (idempotent schema plus optional master bootstrap) and
//! serves the router.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=sqlite://taskdeck.db cargo run
//! ```

use taskdeck::{
    app::{build_router, AppState},
    auth::{password, policy},
    config::Config,
    db,
    models::user::{NewUser, User},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("taskdeck v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = db::pool::create_pool(&config.database).await?;
    db::schema::init(&pool).await?;

    bootstrap_master(&pool, &config).await?;

    let addr = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the configured master account if it doesn't exist yet
///
/// Self-registration always yields the default role, so the first elevated
/// account comes from `MASTER_EMAIL`/`MASTER_PASSWORD`. Safe to run on every
/// start: an existing account with that email is left alone.
async fn bootstrap_master(pool: &sqlx::SqlitePool, config: &Config) -> anyhow::Result<()> {
    let Some(master) = &config.master else {
        return Ok(());
    };

    if User::find_by_email(pool, &master.email).await?.is_some() {
        return Ok(());
    }

    let password_hash = password::hash_password(&master.password)?;
    let user = User::create(
        pool,
        NewUser {
            name: master.name.clone(),
            email: master.email.clone(),
            role: policy::MASTER_ROLE.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "master account bootstrapped");

    Ok(())
}
