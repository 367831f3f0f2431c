use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Stored exchange rates are invalid: {0}")]
    InvalidRates(#[from] currency::CurrencyError),

    #[error("Stored value for '{column}' is out of range: {value}")]
    OutOfRange { column: &'static str, value: i64 },
}
