pub mod macros;
pub mod middleware_handling;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(anyhow::Error),
    DatabaseError(anyhow::Error),
    ServerError(anyhow::Error),
    HashError(anyhow::Error),
    SigningError(anyhow::Error),
    ValidationError(String),
    NotFoundError(String),
    AuthenticationError(String),
    InvalidToken(String),
    ResourceExistsError(String),
    NetworkError(String),
}

impl AppError {
    // Same message for unknown user and wrong password
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationError("Invalid username or password".to_string())
    }

    pub fn token_invalid(reason: impl Into<String>) -> Self {
        Self::InvalidToken(reason.into())
    }

    pub fn username_taken() -> Self {
        Self::ResourceExistsError("Username already exists".to_string())
    }

    pub fn resource_not_found(resource_type: &str) -> Self {
        Self::NotFoundError(format!("{} not found", resource_type))
    }

    pub fn invalid_request() -> Self {
        Self::ValidationError("Invalid request".to_string())
    }

    /// HTTP status, public message and stable code for this error.
    ///
    /// Internal causes (database, crypto, configuration) are never part of
    /// the public message.
    pub fn classify(&self) -> (StatusCode, &str, &'static str) {
        match self {
            Self::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "System configuration error",
                "CONFIG_ERROR",
            ),
            Self::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database operation failed",
                "DB_ERROR",
            ),
            Self::ServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "SERVER_ERROR",
            ),
            Self::HashError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not process credentials",
                "HASH_ERROR",
            ),
            Self::SigningError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not log in",
                "SIGNING_ERROR",
            ),
            Self::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, msg.as_str(), "VALIDATION_ERROR")
            }
            Self::ResourceExistsError(msg) => {
                (StatusCode::BAD_REQUEST, msg.as_str(), "RESOURCE_EXISTS")
            }
            Self::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg.as_str(), "NOT_FOUND"),
            Self::AuthenticationError(msg) => {
                (StatusCode::UNAUTHORIZED, msg.as_str(), "AUTH_ERROR")
            }
            Self::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Unauthorized", "UNAUTHORIZED"),
            Self::NetworkError(msg) => (StatusCode::BAD_GATEWAY, msg.as_str(), "UPSTREAM_ERROR"),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::ServerError(error)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
        Self::invalid_request()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(e) => write!(f, "Configuration error: {:#}", e),
            Self::DatabaseError(e) => write!(f, "Database error: {:#}", e),
            Self::ServerError(e) => write!(f, "Server error: {:#}", e),
            Self::HashError(e) => write!(f, "Password hashing error: {:#}", e),
            Self::SigningError(e) => write!(f, "Token signing error: {:#}", e),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            Self::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            Self::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            Self::ResourceExistsError(msg) => write!(f, "Resource exists: {}", msg),
            Self::NetworkError(msg) => write!(f, "Upstream error: {}", msg),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = self.classify();

        let help_text = match &self {
            Self::ValidationError(_) => Some("Please review your input and try again."),
            Self::InvalidToken(_) => Some("Please log in to access this resource."),
            Self::NetworkError(_) => Some("Please try again later."),
            _ => None,
        };

        let log_message = format!("[{}] {}: {}", error_code, status, self);
        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status.as_u16(),
                "{}",
                log_message
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status.as_u16(),
                "{}",
                log_message
            );
        }

        let mut body = ErrorResponse::new(error_message, error_code);
        if let Some(help) = help_text {
            body = body.with_help(help);
        }

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// Wrap foreign errors into a specific AppError variant
pub trait AppErrorExt<T> {
    fn config_err(self) -> AppResult<T>;
    fn db_err(self) -> AppResult<T>;
    fn server_err(self) -> AppResult<T>;
}

impl<T, E> AppErrorExt<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn config_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ConfigError(e.into()))
    }

    fn db_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::DatabaseError(e.into()))
    }

    fn server_err(self) -> AppResult<T> {
        self.map_err(|e| AppError::ServerError(e.into()))
    }
}
