//! # xs-db
//!
//! Database pool and schema migrations for the xs-website API.
//!
//! Migrations live in the workspace `migrations/` directory and are embedded
//! into the binary at compile time, so the server and `xs-cli migrate` always
//! apply the same set.
//!
//! # Example
//!
//! ```ignore
//! use xs_config::DatabaseConfig;
//!
//! let config = DatabaseConfig::from_env().expect("DATABASE_URL must be set");
//! let pool = xs_db::init_db_pool(&config).await?;
//! xs_db::run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use xs_config::DatabaseConfig;

pub use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens a PostgreSQL connection pool sized by [`DatabaseConfig::max_connections`].
pub async fn init_db_pool(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

/// Applies every pending migration. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "database schema is up to date"
    );
    Ok(())
}
