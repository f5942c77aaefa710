//! Data models shared by every filesdk crate.

mod credential;
mod file;
mod quality;
mod upload;

pub use credential::{BackendHints, CommandKind, ScopedCredential};
pub use file::{split_file_name, FileMetadataExtras, FileRecord, StoredVariant};
pub use quality::{Quality, QualitySet};
pub use upload::UploadOptions;
