use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::{StoreError, UniqueKey};

/// Stable, machine-readable error codes carried in every error body.
pub mod codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const INVALID_ID: &str = "invalid_id";
    pub const USER_EXISTS: &str = "user_exists";
    pub const USERNAME_TAKEN: &str = "username_taken";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const USER_NOT_FOUND: &str = "user_not_found";
    pub const CONNECTION_EXISTS: &str = "connection_exists";
    pub const REQUEST_NOT_FOUND: &str = "request_not_found";
    pub const FRIENDSHIP_NOT_FOUND: &str = "friendship_not_found";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

pub type AppResult<T> = Result<T, AppError>;

/// Outcome of every core operation that did not succeed.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    /// Storage, hashing or signing failure. The cause is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict { code, message: message.into() }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound { code, message: message.into() }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized { code, message: message.into() }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        Self::Internal(cause.to_string())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Unauthorized { code, .. } => code,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(UniqueKey::Email) => {
                AppError::conflict(codes::USER_EXISTS, "User with this email already exists")
            }
            StoreError::UniqueViolation(UniqueKey::Username) => {
                AppError::conflict(codes::USERNAME_TAKEN, "Username is already taken")
            }
            StoreError::UniqueViolation(UniqueKey::ConnectionPair) => {
                AppError::conflict(codes::CONNECTION_EXISTS, "Connection request already exists")
            }
            StoreError::ForeignKeyViolation => {
                AppError::not_found(codes::USER_NOT_FOUND, "User not found")
            }
            other => AppError::internal(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(cause) => {
                tracing::error!("Request failed with internal error: {}", cause);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
