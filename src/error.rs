use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Shared human-readable messages used across handlers and services.
pub mod msg {
    pub const EMAIL_EMPTY: &str = "Email cannot be empty";
    pub const INVALID_EMAIL_FORMAT: &str = "Invalid email format";
    pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
    pub const NAME_EMPTY: &str = "Name cannot be empty";
    pub const CLIENT_NAME_EMPTY: &str = "Client name cannot be empty";
    pub const MODULE_NAME_EMPTY: &str = "Module name cannot be empty";
    pub const MAX_USES_INVALID: &str = "max_uses must be at least 1";
    pub const MAX_DEVICES_INVALID: &str = "max_devices cannot be negative";

    pub const USER_NOT_FOUND: &str = "User not found";
    pub const CODE_NOT_FOUND: &str = "Invitation code not found";
    pub const LICENSE_NOT_FOUND: &str = "License not found";
    pub const DEVICE_NOT_FOUND: &str = "Device not found";
    pub const MODULE_NOT_FOUND: &str = "Module not found";
}

/// Business outcomes of registration and login.
///
/// These are expected failures, not faults: each one maps to a single 4xx
/// status and carries a message that is safe to show to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("Invalid invitation code")]
    InvalidCode,

    #[error("Invitation code exhausted")]
    CodeExhausted,

    #[error("Invitation code expired")]
    CodeExpired,

    #[error("Email already registered")]
    EmailTaken,

    /// Covers both unknown email and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account disabled")]
    AccountDisabled,
}

impl AuthFailure {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthFailure::InvalidCode | AuthFailure::CodeExhausted | AuthFailure::CodeExpired => {
                StatusCode::BAD_REQUEST
            }
            AuthFailure::EmailTaken => StatusCode::CONFLICT,
            AuthFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthFailure::AccountDisabled => StatusCode::FORBIDDEN,
        }
    }
}

/// Reasons a session token is rejected.
///
/// Kept distinct for logging; every variant becomes `AppError::Unauthorized`
/// before it reaches a client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token algorithm does not match")]
    AlgorithmMismatch,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(#[from] AuthFailure),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        tracing::debug!("Token rejected: {}", err);
        AppError::Unauthorized
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone())),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone())),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Auth(failure) => (failure.status(), "Request rejected", Some(failure.to_string())),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Converts a missing row into a `NotFound` error.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.into()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
