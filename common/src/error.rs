//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! Validation failures are always reported before the location store is
//! touched. Storage failures carry the internal cause for logs; use
//! [`LocatorError::external_message`] for anything shown to clients.

use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<config::ConfigError> for CommonError {
    fn from(err: config::ConfigError) -> Self {
        CommonError::Config(err.to_string())
    }
}

/// Location service error type
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// The underlying coordinate store is unavailable or failed mid-operation
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LocatorError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        LocatorError::Common(CommonError::Validation(message.into()))
    }

    /// Returns true for caller errors that never reached the store.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Common(CommonError::Validation(_)))
    }

    /// Returns a safe error message for external clients.
    ///
    /// Validation messages are actionable and returned verbatim. Storage
    /// failures collapse into a generic message; the cause only goes to logs.
    pub fn external_message(&self) -> String {
        match self {
            Self::Common(CommonError::Validation(message)) => message.clone(),
            Self::Common(_) => "Request error".to_string(),
            Self::Storage(_) => "Location store unavailable".to_string(),
        }
    }

    /// Returns a stable machine-readable error type string.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "validation_error",
            Self::Common(_) => "invalid_request_error",
            Self::Storage(_) => "storage_error",
        }
    }
}

/// Result alias for location service operations
pub type LocatorResult<T> = Result<T, LocatorError>;
