//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion. Client-facing variants carry a
//! machine-readable code (e.g. `CODE_EXISTS`) alongside the message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{1}")]
    Forbidden(&'static str, String),

    // Resource errors
    #[error("{1}")]
    NotFound(&'static str, String),

    #[error("{1}")]
    Conflict(&'static str, String),

    // Validation
    #[error("{1}")]
    BadRequest(&'static str, String),

    #[error("{0}")]
    Validation(String),

    // Rate limiting
    #[error("Too many requests")]
    TooManyRequests,

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body: `{ "code": ..., "message": ... }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Forbidden(code, _)
            | AppError::NotFound(code, _)
            | AppError::Conflict(code, _)
            | AppError::BadRequest(code, _) => code,
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::TooManyRequests => "TOO_MANY_REQUESTS",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Jwt(_) => "AUTH_ERROR",
            AppError::Cache(_) => "CACHE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials | AppError::Jwt(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(..) => StatusCode::FORBIDDEN,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Conflict(..) => StatusCode::CONFLICT,
            AppError::BadRequest(..) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Hide details for internal/security errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                "A cache error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            // Client errors carry their own message
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, code: &'static str, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, code: &'static str, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(code, format!("{} not found", entity)))
    }
}

/// Convenience constructors
impl AppError {
    pub fn forbidden(code: &'static str, msg: impl Into<String>) -> Self {
        AppError::Forbidden(code, msg.into())
    }

    pub fn not_found(code: &'static str, msg: impl Into<String>) -> Self {
        AppError::NotFound(code, msg.into())
    }

    pub fn conflict(code: &'static str, msg: impl Into<String>) -> Self {
        AppError::Conflict(code, msg.into())
    }

    pub fn bad_request(code: &'static str, msg: impl Into<String>) -> Self {
        AppError::BadRequest(code, msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coded_errors_expose_their_code() {
        let err = AppError::conflict("CODE_EXISTS", "Department code already exists");
        assert_eq!(err.code(), "CODE_EXISTS");
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Department code already exists");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::internal("connection pool exhausted");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "An internal error occurred");
    }

    #[test]
    fn test_option_ext_builds_not_found() {
        let missing: Option<u8> = None;
        let err = missing
            .ok_or_not_found("PATIENT_NOT_FOUND", "Patient")
            .unwrap_err();
        assert_eq!(err.code(), "PATIENT_NOT_FOUND");
        assert_eq!(err.to_string(), "Patient not found");
    }
}
