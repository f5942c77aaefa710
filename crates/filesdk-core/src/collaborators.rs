//! Contracts for the two remote services the SDK depends on.
//!
//! The HTTP implementations live in `filesdk-api-client`; tests substitute
//! in-memory ones.

use async_trait::async_trait;

use crate::error::SdkResult;
use crate::models::{CommandKind, FileRecord, ScopedCredential};
use crate::storage_types::BackendKind;

/// Parameters of one credential request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CredentialRequest<'a> {
    pub command: CommandKind,
    /// Preferred backend; the issuer may pick another one.
    pub backend_kind: Option<BackendKind>,
    /// Requested container / directory.
    pub path: Option<&'a str>,
    /// Caller `authorization` header forwarded to the issuer.
    pub authorization: Option<&'a str>,
}

impl<'a> CredentialRequest<'a> {
    pub fn new(command: CommandKind) -> Self {
        Self {
            command,
            backend_kind: None,
            path: None,
            authorization: None,
        }
    }
}

/// Issues short-lived, operation-scoped storage credentials.
///
/// Implementations fail with `AuthorizationFailed` when the issuer cannot be
/// reached or refuses, and with `UnsupportedBackend` when it names a backend
/// this build does not know.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn issue(&self, request: CredentialRequest<'_>) -> SdkResult<ScopedCredential>;
}

/// Persistence for file metadata records.
///
/// Lookups of unknown ids fail with `NotFound`; every other failure is
/// `Metadata`.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Persist a new record and return it as stored (with its id).
    async fn create(&self, record: &FileRecord, authorization: Option<&str>) -> SdkResult<FileRecord>;

    async fn get(&self, id: &str, authorization: Option<&str>) -> SdkResult<FileRecord>;

    /// Records for `ids`. Unknown ids are simply absent from the result.
    async fn get_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<Vec<FileRecord>>;

    async fn archive(&self, id: &str, authorization: Option<&str>) -> SdkResult<()>;

    async fn archive_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<()>;

    async fn delete(&self, id: &str, authorization: Option<&str>) -> SdkResult<()>;

    async fn delete_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<()>;
}
