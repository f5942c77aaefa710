//! filesdk Storage Library
//!
//! Storage adapters for the providers filesdk can write to, plus the naming
//! rules they share.
//!
//! # Object addressing
//!
//! Every object is addressed by `(object_path, object_name)`:
//!
//! - **Azure**: container / blob name
//! - **S3**: bucket / key
//! - **Local**: directory under the storage root / file name
//!
//! Variant names are derived from the base object name by
//! [`naming::variant_object_name`], so every backend stores `cat.png`,
//! `cat@200.png` and `cat@50pc.png` side by side.

#[cfg(feature = "storage-azure")]
pub mod azure;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod naming;
pub mod registry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-azure")]
pub use azure::AzureBlobAdapter;
pub use filesdk_core::BackendKind;
#[cfg(feature = "storage-local")]
pub use local::LocalAdapter;
pub use naming::{
    quality_from_object_name, variant_object_name, AdapterProbe, NameProbe, NameResolver,
};
pub use registry::{create_registry, AdapterRegistry};
#[cfg(feature = "storage-s3")]
pub use s3::S3Adapter;
pub use traits::{StorageAdapter, StorageError, StorageResult};
