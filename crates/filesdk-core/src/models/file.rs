use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::models::quality::Quality;
use crate::storage_types::BackendKind;

/// One stored rendition of a file (`compressions[]` on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVariant {
    pub quality: Quality,
    pub url: String,
    #[serde(rename = "bucketFilePath")]
    pub object_path: String,
    #[serde(rename = "bucketFileName")]
    pub object_name: String,
}

/// Caller-supplied fields copied verbatim into the metadata record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_archived: bool,
}

/// Persisted metadata describing a file and all of its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "bucketType")]
    pub backend_kind: BackendKind,
    #[serde(rename = "bucketFilePath")]
    pub base_path: String,
    #[serde(rename = "bucketFileName")]
    pub base_object_name: String,
    pub original_file_name: String,
    #[serde(default)]
    pub extension: String,
    #[serde(rename = "size")]
    pub byte_size: u64,
    pub url: String,
    pub thumbnail_url: String,
    #[serde(rename = "compressions")]
    pub variants: Vec<StoredVariant>,
    pub mime_type: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

impl FileRecord {
    /// Build a record from uploaded variants.
    ///
    /// `url` is taken from the quality-1 variant and `thumbnail_url` from the
    /// numerically smallest one.
    pub fn assemble(
        backend_kind: BackendKind,
        base_path: &str,
        base_object_name: &str,
        byte_size: u64,
        mime_type: &str,
        variants: Vec<StoredVariant>,
        extras: FileMetadataExtras,
    ) -> Result<Self, SdkError> {
        let (_, extension) = split_file_name(base_object_name);

        let mut record = FileRecord {
            id: None,
            name: base_object_name.to_string(),
            backend_kind,
            base_path: base_path.to_string(),
            base_object_name: base_object_name.to_string(),
            original_file_name: base_object_name.to_string(),
            extension: extension.unwrap_or_default().to_string(),
            byte_size,
            url: String::new(),
            thumbnail_url: String::new(),
            variants,
            mime_type: mime_type.to_string(),
            is_archived: extras.is_archived,
            created_by: extras.created_by,
            tags: extras.tags,
            organization: extras.organization,
        };

        record.validate()?;
        record.url = record.original()?.url.clone();
        record.thumbnail_url = record.thumbnail()?.url.clone();
        Ok(record)
    }

    /// Checks the variant invariants: non-empty, exactly one original.
    pub fn validate(&self) -> Result<(), SdkError> {
        let originals = self.variants.iter().filter(|v| v.quality.is_original()).count();
        if originals != 1 {
            return Err(SdkError::InvalidArgument(format!(
                "file {} must have exactly one original variant, found {}",
                self.name, originals
            )));
        }
        Ok(())
    }

    pub fn original(&self) -> Result<&StoredVariant, SdkError> {
        self.variants
            .iter()
            .find(|v| v.quality.is_original())
            .ok_or_else(|| {
                SdkError::InvalidArgument(format!("file {} has no original variant", self.name))
            })
    }

    pub fn thumbnail(&self) -> Result<&StoredVariant, SdkError> {
        self.variants
            .iter()
            .min_by(|a, b| a.quality.value().total_cmp(&b.quality.value()))
            .ok_or_else(|| SdkError::InvalidArgument(format!("file {} has no variants", self.name)))
    }

    /// Identifier used in logs and batch reports.
    pub fn id_or_name(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// Split `photo.final.png` into (`photo.final`, `Some("png")`).
///
/// Dotfiles such as `.env` and names ending in a dot have no extension.
pub fn split_file_name(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}
