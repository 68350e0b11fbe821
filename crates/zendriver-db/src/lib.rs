//! # ZenDriver DB
//!
//! PostgreSQL connection pool and embedded migrations.
//!
//! # Example
//!
//! ```ignore
//! use zendriver_config::DatabaseConfig;
//! use zendriver_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;
use zendriver_config::{ConfigError, DatabaseConfig};

pub use sqlx::PgPool;

/// Migrations under the workspace `migrations/` directory, embedded at
/// compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] MigrateError),
}

/// Opens a connection pool using `DATABASE_URL`.
///
/// The pool is cheap to clone; build it once at startup and hand it to the
/// repository.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let url = config.require_url()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await
        .map_err(DbError::Connect)?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Creates or upgrades the schema.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
