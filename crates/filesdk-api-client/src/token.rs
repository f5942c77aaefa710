use async_trait::async_trait;
use chrono::{DateTime, Utc};
use filesdk_core::{
    BackendHints, BackendKind, CredentialProvider, CredentialRequest, ScopedCredential, SdkError,
    SdkResult,
};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::FileApiClient;

/// Body of `GET /files/token/{operation}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub bucket_type: String,
    pub sas: String,
    #[serde(default)]
    pub expires_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: Option<BackendHints>,
}

impl TokenResponse {
    /// Validate the backend kind and build the credential.
    pub fn into_credential(self) -> SdkResult<ScopedCredential> {
        let kind: BackendKind = self.bucket_type.parse()?;
        let mut credential =
            ScopedCredential::new(kind, self.sas).with_hints(self.meta.unwrap_or_default());
        if let Some(expires_on) = self.expires_on {
            credential = credential.with_expiry(expires_on);
        }
        Ok(credential)
    }
}

#[async_trait]
impl CredentialProvider for FileApiClient {
    async fn issue(&self, request: CredentialRequest<'_>) -> SdkResult<ScopedCredential> {
        let mut query = Vec::new();
        if let Some(kind) = request.backend_kind {
            query.push(("bucketType", kind.as_str().to_string()));
        }
        if let Some(path) = request.path.filter(|p| !p.is_empty()) {
            query.push(("filePath", path.to_string()));
        }

        let token: TokenResponse = self
            .call_json_exact(
                Method::GET,
                &format!("/files/token/{}", request.command),
                &query,
                request.authorization,
                StatusCode::OK,
            )
            .await
            .map_err(|e| {
                tracing::warn!(command = %request.command, error = %e, "Credential request failed");
                SdkError::AuthorizationFailed(format!("cannot get {} credential: {}", request.command, e))
            })?;

        let credential = token.into_credential()?;
        tracing::debug!(
            command = %request.command,
            backend = %credential.backend_kind,
            expires_at = ?credential.expires_at,
            "Credential issued"
        );
        Ok(credential)
    }
}
