//! Error handling module
//!
//! Application-level failures: configuration, startup and serving. Protocol
//! failures never surface here, they travel as `RpcError` inside a response.

use thiserror::Error;
use warp::http::StatusCode;

use crate::domain::service::{LookupError, RegistrationError};

/// Application error types
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Method lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Request too large: {size} bytes exceeds limit of {limit} bytes")]
    RequestTooLarge { size: usize, limit: usize },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status used when this error is reported at the transport level
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::Lookup(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RequestTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Application result type
pub type AppResult<T> = Result<T, AppError>;

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Internal(format!("metrics registry: {}", err))
    }
}
