use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SdkError;
use crate::storage_types::BackendKind;

/// Operation a credential is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Create,
    Update,
    Read,
    Delete,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Create => "create",
            CommandKind::Update => "update",
            CommandKind::Read => "read",
            CommandKind::Delete => "delete",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-specific routing data issued with a credential (`meta` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendHints {
    /// Container / bucket / directory the credential is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible providers or emulators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Short-lived, operation- and backend-scoped authorization.
///
/// Obtained once per operation and dropped with it; never cached.
#[derive(Clone, PartialEq)]
pub struct ScopedCredential {
    pub backend_kind: BackendKind,
    pub secret: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub hints: BackendHints,
}

impl ScopedCredential {
    pub fn new(backend_kind: BackendKind, secret: impl Into<String>) -> Self {
        Self {
            backend_kind,
            secret: secret.into(),
            expires_at: None,
            hints: BackendHints::default(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_hints(mut self, hints: BackendHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    /// Fails with `AuthorizationFailed` once the expiry has passed.
    pub fn ensure_valid(&self) -> Result<(), SdkError> {
        if self.is_expired_at(Utc::now()) {
            return Err(SdkError::AuthorizationFailed(format!(
                "{} credential expired",
                self.backend_kind
            )));
        }
        Ok(())
    }

    /// Object path for an operation: the credential's container always wins
    /// over what the caller asked for.
    pub fn object_path(&self, requested: Option<&str>) -> Option<String> {
        self.hints
            .container_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(requested.filter(|p| !p.is_empty()))
            .map(str::to_string)
    }
}

impl fmt::Debug for ScopedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCredential")
            .field("backend_kind", &self.backend_kind)
            .field("secret", &"***")
            .field("expires_at", &self.expires_at)
            .field("hints", &self.hints)
            .finish()
    }
}
