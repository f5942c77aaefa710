//! filesdk
//!
//! Client-side SDK for storing files on a pluggable object store and recording
//! them in a file metadata service.
//!
//! An upload asks the file API for a short-lived credential, picks the storage
//! adapter the credential is issued for, resolves a collision-free object name,
//! expands images into the requested quality variants, uploads every variant
//! and finally persists a [`FileRecord`] describing them. Deletes either
//! archive the record (soft) or remove every stored variant before removing
//! the record (hard).
//!
//! ```no_run
//! use filesdk::{FileSdk, SdkConfig, UploadOptions};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let sdk = FileSdk::from_config(SdkConfig::from_env()?).await?;
//! let record = sdk
//!     .upload_from_local_path(
//!         "holiday.jpg",
//!         UploadOptions::default().with_qualities([0.5, 200.0]),
//!     )
//!     .await?;
//! println!("{} -> {}", record.name, record.url);
//! # Ok(())
//! # }
//! ```

mod delete;
mod sdk;
mod upload;

pub use delete::{BatchDeleteReport, BatchFailure};
pub use sdk::FileSdk;

pub use filesdk_core::{
    BackendHints, BackendKind, CommandKind, CredentialProvider, CredentialRequest,
    FileMetadataExtras, FileRecord, MetadataStore, Quality, QualitySet, ScopedCredential,
    SdkConfig, SdkError, SdkResult, StoredVariant, UploadOptions,
};
pub use filesdk_processing::{CompressionEngine, CompressionOutcome, SkipReason};
pub use filesdk_storage::{AdapterRegistry, NameResolver, StorageAdapter, StorageError};
