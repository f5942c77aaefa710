//! filesdk Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and
//! collaborator contracts shared by every filesdk component: storage
//! adapters, the compression engine, the HTTP collaborators and the
//! upload/delete orchestrator.

pub mod collaborators;
pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use collaborators::{CredentialProvider, CredentialRequest, MetadataStore};
pub use config::SdkConfig;
pub use error::{BoxError, LogLevel, SdkError, SdkResult};
pub use models::{
    BackendHints, CommandKind, FileMetadataExtras, FileRecord, Quality, QualitySet,
    ScopedCredential, StoredVariant, UploadOptions,
};
pub use storage_types::BackendKind;
