//! Error types module
//!
//! All reaper errors are unified under `AppError`. Each variant describes how
//! it should be reported through `ErrorMetadata`, which the reaper uses to
//! choose a log level when a single upload fails to delete.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Recoverable issues that the next cycle will likely resolve
    Warn,
    /// Unexpected failures
    Error,
}

/// Self-description of an error for logging and retry decisions
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether retrying on a later cycle can succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::InvalidConfig(_) => "INVALID_CONFIG",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => true,
            AppError::InvalidConfig(_) => false,
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Storage(_) => LogLevel::Warn,
            AppError::Database(_) | AppError::InvalidConfig(_) | AppError::Internal(_) => {
                LogLevel::Error
            }
        }
    }
}
