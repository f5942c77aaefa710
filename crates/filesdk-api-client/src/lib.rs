//! HTTP client for the file API.
//!
//! One client covers both remote collaborators of the SDK: the token endpoint
//! that issues scoped storage credentials (`token` module) and the metadata
//! REST resource (`metadata` module). Every request forwards an optional
//! `authorization` header: the per-call value when given, otherwise the
//! client default.

pub mod metadata;
pub mod token;

use anyhow::{Context, Result};
use filesdk_core::SdkConfig;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub use token::TokenResponse;

/// Transport-level failure of a file API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse response as JSON: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP client for the file API with a default authorization header.
#[derive(Clone)]
pub struct FileApiClient {
    client: Client,
    base_url: String,
    authorization: Option<String>,
}

impl FileApiClient {
    pub fn new(base_url: impl Into<String>, authorization: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization,
        })
    }

    pub fn from_config(config: &SdkConfig) -> Result<Self> {
        Self::new(
            config.file_api_url.clone(),
            config.authorization.clone(),
            config.http_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, authorization: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.build_url(path));
        match authorization.or(self.authorization.as_deref()) {
            Some(auth) => request.header("authorization", auth),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status { status, body });
        }

        Ok(response)
    }

    /// Send a request and deserialize the JSON response.
    pub(crate) async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
        authorization: Option<&str>,
    ) -> Result<T, ApiError> {
        let request = self.json_request(method, path, query, body, authorization);
        let response = Self::send(request).await?;
        Self::decode(response).await
    }

    /// Like `call_json`, but any status other than `expected` is an error.
    pub(crate) async fn call_json_exact<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        authorization: Option<&str>,
        expected: StatusCode,
    ) -> Result<T, ApiError> {
        let request = self.json_request(method, path, query, None, authorization);
        let response = Self::send(request).await?;
        let status = response.status();
        if status != expected {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status { status, body });
        }
        Self::decode(response).await
    }

    fn json_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
        authorization: Option<&str>,
    ) -> RequestBuilder {
        let mut request = self.request(method, path, authorization);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request and ignore any response body.
    pub(crate) async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        authorization: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut request = self.request(method, path, authorization);
        if !query.is_empty() {
            request = request.query(query);
        }
        Self::send(request).await?;
        Ok(())
    }
}

impl std::fmt::Debug for FileApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileApiClient")
            .field("base_url", &self.base_url)
            .field("authorization", &self.authorization.as_ref().map(|_| "***"))
            .finish()
    }
}

/// `_ids[]` query pairs for batch endpoints.
pub(crate) fn ids_query(ids: &[String]) -> Vec<(&'static str, String)> {
    ids.iter().map(|id| ("_ids[]", id.clone())).collect()
}
