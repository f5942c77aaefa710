use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::SdkError;

/// Storage backend kinds
///
/// The authorization collaborator names the backend an operation is scoped
/// to as a plain string (`bucketType`). It is parsed into this enum before
/// any adapter lookup happens, so an unknown provider is rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Azure,
    #[serde(alias = "s3")]
    Aws,
    Google,
    Local,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Azure => "azure",
            BackendKind::Aws => "aws",
            BackendKind::Google => "google",
            BackendKind::Local => "local",
        }
    }
}

impl FromStr for BackendKind {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure" => Ok(BackendKind::Azure),
            "aws" | "s3" => Ok(BackendKind::Aws),
            "google" | "gcs" => Ok(BackendKind::Google),
            "local" => Ok(BackendKind::Local),
            _ => Err(SdkError::UnsupportedBackend(s.to_string())),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
