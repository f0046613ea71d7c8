//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized failure returned by every service operation
///
/// No provider-specific failure type crosses the service boundary; callers only
/// ever see this shape. `error_code` is present when the provider reported a
/// machine-readable code (e.g. `PRODUCT_NOT_READY`) and absent for transport
/// failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{error_message}")]
pub struct DomainError {
    pub error_code: Option<String>,
    pub error_message: String,
}

impl DomainError {
    /// Error carrying a provider-supplied code
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: Some(code.into()),
            error_message: message.into(),
        }
    }

    /// Error without a machine-readable code
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            error_code: None,
            error_message: message.into(),
        }
    }
}

/// Wire envelope for a failed operation: `{ "error": { "error_code", "error_message" } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: DomainError,
}

impl From<DomainError> for ErrorResponse {
    fn from(error: DomainError) -> Self {
        Self { error }
    }
}

/// Core library error for failures outside the provider boundary
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
