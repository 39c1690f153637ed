/// Error types for the Quill API
///
/// Every failure a handler can surface is one of these variants; the
/// `ResponseError` impl maps each to a status code and the uniform response
/// envelope. Token verification failures never reach this type — they
/// degrade to an anonymous request instead (see `security::identity`).
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

use crate::response::ApiResponse;

/// Result type for Quill API operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input fields
    #[error("{0}")]
    InvalidInput(String),

    /// Uniqueness violation (email, username, title, slug)
    #[error("{0}")]
    Conflict(String),

    /// Signin failure; deliberately a 400, matching the existing client
    /// contract, and deliberately silent about which credential was wrong
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Identity required but the request is anonymous
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but the access policy denies the action
    #[error("{0}")]
    Forbidden(String),

    /// Resource absent
    #[error("{0}")]
    NotFound(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Configuration problem detected at runtime (e.g. signing key missing)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::Conflict(_)
            | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // 5xx details go to the log, not the client.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "An unexpected error occurred".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ApiResponse::<()>::error(message, status.as_u16()))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            other => AppError::Database(other),
        }
    }
}
