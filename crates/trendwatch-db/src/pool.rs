//! Pool construction, migrations and liveness.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::DbError;

// Relative to this crate's Cargo.toml: <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

const SUCCESSFUL_MIGRATIONS: &str = "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 10,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &trendwatch_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

/// Open a Postgres pool for `database_url`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if no connection can be established within the
/// acquire timeout.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

async fn successful_migrations(pool: &PgPool) -> i64 {
    // Missing on a fresh database.
    sqlx::query_scalar::<_, i64>(SUCCESSFUL_MIGRATIONS)
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Apply pending migrations and return how many were applied.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let before = successful_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let after = successful_migrations(pool).await;
    Ok(usize::try_from(after - before).unwrap_or(0))
}

/// Round-trip `SELECT 1` through the pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
