mod postgres_repository;

pub use postgres_repository::create_postgres_repository;

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connect to Postgres with retries and make sure the schema exists.
///
/// Startup races against the database container in most deployments, so a
/// fresh pool is retried `retry_count` times with a short pause between
/// attempts before giving up.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut attempts = 0u32;
    let pool = loop {
        // ---
        let options = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        match options.connect(&config.database_url).await {
            Ok(pool) => break pool,
            Err(err) => {
                attempts += 1;
                if attempts >= config.retry_count {
                    return Err(err).context("database connection failed after retries");
                }
                tracing::warn!(attempt = attempts, "database not ready: {err}");
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }
    };

    init_schema(&pool).await?;
    Ok(pool)
}

/// Idempotent schema bootstrap. Email uniqueness lives here, as a unique
/// index, so concurrent registrations serialize in the database rather
/// than in application code.
async fn init_schema(pool: &PgPool) -> Result<()> {
    // ---
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
             id UUID PRIMARY KEY,
             name TEXT NOT NULL,
             email TEXT NOT NULL,
             password_hash TEXT NOT NULL,
             color_preference TEXT NOT NULL,
             sport_preference TEXT NOT NULL,
             graphical_password JSONB NOT NULL,
             role TEXT NOT NULL DEFAULT 'user',
             created_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await
    .context("failed to create users table")?;

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email)")
        .execute(pool)
        .await
        .context("failed to create unique email index")?;

    Ok(())
}
