use crate::error::DbError;
use configuration::DatabaseConfig;
use dotenvy::dotenv;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The URL comes from `DATABASE_URL` (a `.env` file is honoured if present).
/// Every connection carries a server-side `statement_timeout`, so a slow
/// metrics query fails instead of holding a request open.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    if let Err(e) = dotenv() {
        tracing::debug!(error = %e, "No .env file loaded.");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let options = PgConnectOptions::from_str(&database_url)?.options([(
        "statement_timeout",
        format!("{}s", config.statement_timeout_secs),
    )]);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        statement_timeout_secs = config.statement_timeout_secs,
        "Connected to database."
    );
    Ok(pool)
}

/// Applies the embedded migrations, bringing the schema up to date.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
