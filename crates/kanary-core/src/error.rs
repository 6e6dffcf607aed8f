//! Shared error type across kanary crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / out-of-range query parameter.
    BadRequest,
    /// Route or feature not found.
    NotFound,
    /// Deliberately injected failure.
    Simulated,
    /// Service cannot serve traffic right now.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Simulated => "SIMULATED",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Unified error type used by core and the API service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    Validation(String),
    #[error("{0}")]
    FeatureDisabled(String),
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Simulated(String),
    #[error("service unavailable")]
    Unavailable,
    #[error("internal: {0}")]
    Internal(String),
}

impl ApiError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ApiError::Validation(_) => ClientCode::BadRequest,
            ApiError::FeatureDisabled(_) | ApiError::NotFound => ClientCode::NotFound,
            ApiError::Simulated(_) => ClientCode::Simulated,
            ApiError::Unavailable => ClientCode::Unavailable,
            ApiError::Internal(_) => ClientCode::Internal,
        }
    }

    /// HTTP status the error surfaces as. Kept as a plain integer so this
    /// crate stays free of web-framework dependencies.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::FeatureDisabled(_) | ApiError::NotFound => 404,
            ApiError::Simulated(_) | ApiError::Internal(_) => 500,
            ApiError::Unavailable => 503,
        }
    }
}
