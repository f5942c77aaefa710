use crate::traits::{StorageAdapter, StorageError, StorageResult};
use crate::BackendKind;
use async_trait::async_trait;
use bytes::Bytes;
use filesdk_core::ScopedCredential;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

const API_VERSION: &str = "2021-08-06";

/// Azure Blob Storage adapter
///
/// Talks to the Blob REST API with the SAS token issued as the credential
/// secret. Object paths are container names. The account endpoint is
/// `https://{accountName}.blob.core.windows.net` unless the credential hints
/// carry an explicit `endpoint` (emulators, sovereign clouds).
#[derive(Clone)]
pub struct AzureBlobAdapter {
    client: Client,
}

impl AzureBlobAdapter {
    pub fn new(timeout: Duration) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn account_endpoint(credential: &ScopedCredential) -> StorageResult<String> {
        if let Some(endpoint) = credential.hints.endpoint.as_deref().filter(|e| !e.is_empty()) {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        let account = credential
            .hints
            .account_name
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                StorageError::ConfigError(
                    "Azure credential carries neither accountName nor endpoint".to_string(),
                )
            })?;
        Ok(format!("https://{}.blob.core.windows.net", account))
    }

    /// Public URL of a blob, without the SAS query string.
    fn blob_url(credential: &ScopedCredential, container: &str, blob: &str) -> StorageResult<String> {
        Ok(format!(
            "{}/{}/{}",
            Self::account_endpoint(credential)?,
            container,
            urlencoding::encode(blob)
        ))
    }

    fn container_url(credential: &ScopedCredential, container: &str) -> StorageResult<String> {
        Ok(format!("{}/{}", Self::account_endpoint(credential)?, container))
    }

    /// Append the SAS token (and an optional extra query) to a resource URL.
    fn signed(url: &str, credential: &ScopedCredential, extra_query: Option<&str>) -> String {
        let sas = credential.secret.trim_start_matches('?');
        match (extra_query, sas.is_empty()) {
            (Some(extra), true) => format!("{}?{}", url, extra),
            (Some(extra), false) => format!("{}?{}&{}", url, extra, sas),
            (None, true) => url.to_string(),
            (None, false) => format!("{}?{}", url, sas),
        }
    }

    async fn send(request: RequestBuilder) -> StorageResult<Response> {
        request
            .header("x-ms-version", API_VERSION)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Azure request failed: {}", e)))
    }

    async fn rejected(response: Response, make: fn(String) -> StorageError) -> StorageError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = format!("status {}: {}", status, body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized(message),
            _ => make(message),
        }
    }

    /// Create the container with public blob access if it does not exist.
    async fn ensure_container(&self, credential: &ScopedCredential, container: &str) -> StorageResult<()> {
        let url = Self::container_url(credential, container)?;

        let response = Self::send(
            self.client
                .get(Self::signed(&url, credential, Some("restype=container"))),
        )
        .await?;
        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(Self::rejected(response, StorageError::NamespaceFailed).await);
        }

        let response = Self::send(
            self.client
                .put(Self::signed(&url, credential, Some("restype=container")))
                .header("x-ms-blob-public-access", "blob")
                .header("content-length", "0"),
        )
        .await?;

        match response.status() {
            s if s.is_success() => {
                tracing::info!(container = %container, "Azure container created");
                Ok(())
            }
            // Created concurrently by another upload
            StatusCode::CONFLICT => Ok(()),
            _ => Err(Self::rejected(response, StorageError::NamespaceFailed).await),
        }
    }
}

#[async_trait]
impl StorageAdapter for AzureBlobAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Azure
    }

    async fn put(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        let url = Self::blob_url(credential, object_path, object_name)?;
        let size = data.len();
        let start = std::time::Instant::now();

        self.ensure_container(credential, object_path).await?;

        let response = Self::send(
            self.client
                .put(Self::signed(&url, credential, None))
                .header("x-ms-blob-type", "BlockBlob")
                .header("content-type", content_type)
                .body(data),
        )
        .await?;

        if !response.status().is_success() {
            return Err(Self::rejected(response, StorageError::UploadFailed).await);
        }

        tracing::info!(
            container = %object_path,
            blob = %object_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Azure put successful"
        );

        Ok(url)
    }

    async fn delete_if_exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<()> {
        let url = Self::blob_url(credential, object_path, object_name)?;
        let response = Self::send(self.client.delete(Self::signed(&url, credential, None))).await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::rejected(response, StorageError::DeleteFailed).await),
        }
    }

    async fn exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<bool> {
        let url = Self::blob_url(credential, object_path, object_name)?;
        let response = Self::send(self.client.head(Self::signed(&url, credential, None))).await?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::rejected(response, StorageError::BackendError).await),
        }
    }
}
