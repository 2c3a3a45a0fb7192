use crate::config::ConfigError;
use crate::rubric::{GenerationError, LibraryError, RepositoryError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Library(LibraryError),
    Generation(GenerationError),
    Serialization(serde_json::Error),
    InvalidRequest(String),
    MissingOwner,
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Library(LibraryError::NotFound(_) | LibraryError::ShareNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Library(LibraryError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
            AppError::Library(LibraryError::Persistence(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Library(LibraryError::Persistence(RepositoryError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Generation(GenerationError::Unconfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Generation(GenerationError::MissingCriteria) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Generation(
                GenerationError::Failed(_) | GenerationError::Malformed(_) | GenerationError::Empty,
            ) => StatusCode::BAD_GATEWAY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingOwner => StatusCode::UNAUTHORIZED,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the user may usefully repeat the action that failed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Library(err) => err.is_retryable(),
            AppError::Generation(err) => err.is_retryable(),
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Library(err) => write!(f, "{}", err),
            AppError::Generation(err) => write!(f, "{}", err),
            AppError::Serialization(err) => write!(f, "serialization error: {}", err),
            AppError::InvalidRequest(reason) => write!(f, "invalid request: {}", reason),
            AppError::MissingOwner => write!(f, "missing x-owner-id header"),
            AppError::Internal(reason) => write!(f, "internal error: {}", reason),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Library(err) => Some(err),
            AppError::Generation(err) => Some(err),
            AppError::Serialization(err) => Some(err),
            AppError::InvalidRequest(_) | AppError::MissingOwner | AppError::Internal(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "retryable": self.is_retryable(),
        }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<LibraryError> for AppError {
    fn from(value: LibraryError) -> Self {
        Self::Library(value)
    }
}

impl From<GenerationError> for AppError {
    fn from(value: GenerationError) -> Self {
        Self::Generation(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}
