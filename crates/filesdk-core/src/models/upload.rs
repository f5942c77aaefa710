use crate::models::file::FileMetadataExtras;
use crate::storage_types::BackendKind;

/// Per-upload options; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Object name to store under. Synthesized when absent (creates only).
    pub name: Option<String>,
    /// Overwrite an existing object instead of creating a new one.
    pub is_update: bool,
    /// Quality specifiers; `1` (the original) is always added.
    pub qualities: Vec<f64>,
    pub mime_type: Option<String>,
    /// Requested container/directory. Overridden by credential scoping.
    pub path: Option<String>,
    pub backend_kind: Option<BackendKind>,
    /// Authorization header for this call, overriding the instance default.
    pub authorization: Option<String>,
    pub extras: FileMetadataExtras,
}

impl UploadOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_qualities(mut self, qualities: impl IntoIterator<Item = f64>) -> Self {
        self.qualities = qualities.into_iter().collect();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    pub fn updating(mut self) -> Self {
        self.is_update = true;
        self
    }
}
