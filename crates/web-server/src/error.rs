use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("{0}")]
    Engine(#[from] engine::EngineError),
    #[error("Currency error: {0}")]
    Currency(#[from] currency::CurrencyError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Engine(e) if e.is_validation() => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Engine(engine_err) => {
                tracing::error!(error = ?engine_err, "Engine error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An error occurred during calculation".to_string(),
                )
            }
            AppError::Currency(currency_err) => {
                tracing::error!(error = ?currency_err, "Currency configuration error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A server configuration error occurred".to_string(),
                )
            }
            AppError::Task(join_err) => {
                tracing::error!(error = ?join_err, "Calculation task failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
