//! Storage adapter trait
//!
//! This module defines the contract every storage provider must satisfy.
//! The orchestrator only ever talks to providers through `StorageAdapter`.

use async_trait::async_trait;
use bytes::Bytes;
use filesdk_core::{BackendKind, ScopedCredential, SdkError};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Could not create namespace {0}")]
    NamespaceFailed(String),

    #[error("Credential rejected by backend: {0}")]
    Unauthorized(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for SdkError {
    fn from(err: StorageError) -> Self {
        SdkError::BackendFailure(Box::new(err))
    }
}

/// Storage adapter trait
///
/// An object is addressed by `(object_path, object_name)`: the path is the
/// provider namespace (Azure container, S3 bucket, local directory) and the
/// name is the object inside it. Every call carries the credential issued for
/// the current operation.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Provider this adapter talks to.
    fn kind(&self) -> BackendKind;

    /// Create the namespace if needed, upload the bytes and return the public
    /// URL of the object (without any query string).
    async fn put(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete an object. Succeeds when the object is already gone.
    async fn delete_if_exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<()>;

    /// Check whether an object exists.
    async fn exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<bool>;
}
