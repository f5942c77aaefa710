//! Error types module
//!
//! Every fallible filesdk operation reports one of the `SdkError` variants.
//! Compression problems are deliberately absent: a failed resize degrades the
//! upload to "original only" and is reported through the compression outcome,
//! never through this type.

use std::io;

/// Boxed source error carried by backend and collaborator failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Backend failure: {0}")]
    BackendFailure(#[source] BoxError),

    #[error("Backend objects of file {id} could not be deleted: {}", .objects.join(", "))]
    VariantsNotDeleted { id: String, objects: Vec<String> },

    #[error("Could not find a free object name for {name} after {attempts} attempts")]
    NameCollision { name: String, attempts: usize },

    #[error("Metadata service error: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SdkError {
    /// Machine-readable error code (e.g., "BACKEND_FAILURE")
    pub fn error_code(&self) -> &'static str {
        match self {
            SdkError::InvalidArgument(_) => "INVALID_ARGUMENT",
            SdkError::AuthorizationFailed(_) => "AUTHORIZATION_FAILED",
            SdkError::UnsupportedBackend(_) => "UNSUPPORTED_BACKEND",
            SdkError::NotFound(_) => "NOT_FOUND",
            SdkError::BackendFailure(_) => "BACKEND_FAILURE",
            SdkError::VariantsNotDeleted { .. } => "BACKEND_FAILURE",
            SdkError::NameCollision { .. } => "NAME_COLLISION",
            SdkError::Metadata(_) => "METADATA_ERROR",
            SdkError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the failure happened inside a storage provider.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            SdkError::BackendFailure(_) | SdkError::VariantsNotDeleted { .. }
        )
    }

    /// Log level for this error
    pub fn log_level(&self) -> LogLevel {
        match self {
            SdkError::InvalidArgument(_) | SdkError::NotFound(_) => LogLevel::Debug,
            SdkError::AuthorizationFailed(_)
            | SdkError::UnsupportedBackend(_)
            | SdkError::NameCollision { .. } => LogLevel::Warn,
            SdkError::BackendFailure(_)
            | SdkError::VariantsNotDeleted { .. }
            | SdkError::Metadata(_)
            | SdkError::Io(_) => LogLevel::Error,
        }
    }

    /// Emit this error through `tracing` at its own log level.
    pub fn log(&self, operation: &'static str) {
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(operation, code = self.error_code(), error = %self, "operation failed"),
            LogLevel::Warn => tracing::warn!(operation, code = self.error_code(), error = %self, "operation failed"),
            LogLevel::Error => tracing::error!(operation, code = self.error_code(), error = %self, "operation failed"),
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Metadata(format!("JSON parsing error: {}", err))
    }
}
