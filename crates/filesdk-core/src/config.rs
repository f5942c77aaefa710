//! Configuration module
//!
//! `SdkConfig` is handed to the orchestrator at construction. It replaces any
//! process-wide default: two SDK instances in one process can talk to
//! different file APIs with different default paths.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::BackendKind;

const NAME_PROBE_LIMIT: usize = 16;
const UPLOAD_CONCURRENCY: usize = 4;
const HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_NAMESPACE: &str = "files";

#[derive(Clone)]
pub struct SdkConfig {
    /// Base URL of the file API (token + metadata endpoints).
    pub file_api_url: String,
    /// Default `authorization` header forwarded to the file API.
    pub authorization: Option<String>,
    /// Default container/directory when neither credential nor caller names one.
    pub bucket_file_path: Option<String>,
    /// Preferred backend hint sent with credential requests.
    pub bucket_type: Option<BackendKind>,
    /// Upper bound on existence probes while looking for a free object name.
    pub name_probe_limit: usize,
    /// Maximum number of variant uploads in flight for one file.
    pub upload_concurrency: usize,
    pub http_timeout: Duration,
    pub local_storage_path: Option<PathBuf>,
    pub local_storage_base_url: Option<String>,
}

impl SdkConfig {
    pub fn new(file_api_url: impl Into<String>) -> Self {
        Self {
            file_api_url: file_api_url.into().trim_end_matches('/').to_string(),
            authorization: None,
            bucket_file_path: None,
            bucket_type: None,
            name_probe_limit: NAME_PROBE_LIMIT,
            upload_concurrency: UPLOAD_CONCURRENCY,
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            local_storage_path: None,
            local_storage_base_url: None,
        }
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    pub fn with_bucket_file_path(mut self, path: impl Into<String>) -> Self {
        self.bucket_file_path = Some(path.into());
        self
    }

    pub fn with_bucket_type(mut self, kind: BackendKind) -> Self {
        self.bucket_type = Some(kind);
        self
    }

    pub fn with_local_storage(mut self, path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        self.local_storage_path = Some(path.into());
        self.local_storage_base_url = Some(base_url.into());
        self
    }

    /// Namespace prefix for synthesized object names.
    pub fn default_namespace(&self) -> &str {
        self.bucket_file_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let file_api_url = env::var("FILE_API_URL")
            .map_err(|_| anyhow::anyhow!("FILE_API_URL must be set"))?;

        let mut config = SdkConfig::new(file_api_url);
        config.authorization = env::var("FILE_API_AUTHORIZATION").ok();
        config.bucket_file_path = env::var("BUCKET_FILE_PATH").ok();
        config.bucket_type = match env::var("BUCKET_TYPE") {
            Ok(kind) => Some(
                kind.parse()
                    .map_err(|e| anyhow::anyhow!("BUCKET_TYPE is invalid: {}", e))?,
            ),
            Err(_) => None,
        };
        config.name_probe_limit = env::var("NAME_PROBE_LIMIT")
            .unwrap_or_else(|_| NAME_PROBE_LIMIT.to_string())
            .parse()
            .unwrap_or(NAME_PROBE_LIMIT);
        config.upload_concurrency = env::var("UPLOAD_CONCURRENCY")
            .unwrap_or_else(|_| UPLOAD_CONCURRENCY.to_string())
            .parse()
            .unwrap_or(UPLOAD_CONCURRENCY);
        config.http_timeout = Duration::from_secs(
            env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
        );
        config.local_storage_path = env::var("LOCAL_STORAGE_PATH").ok().map(PathBuf::from);
        config.local_storage_base_url = env::var("LOCAL_STORAGE_BASE_URL").ok();

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.file_api_url.is_empty() {
            return Err(anyhow::anyhow!("no file api url given"));
        }
        if !self.file_api_url.starts_with("http://") && !self.file_api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "FILE_API_URL must be an http(s) URL, got {}",
                self.file_api_url
            ));
        }
        if self.name_probe_limit == 0 {
            return Err(anyhow::anyhow!("NAME_PROBE_LIMIT must be at least 1"));
        }
        if self.upload_concurrency == 0 {
            return Err(anyhow::anyhow!("UPLOAD_CONCURRENCY must be at least 1"));
        }
        if self.local_storage_path.is_some() != self.local_storage_base_url.is_some() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH and LOCAL_STORAGE_BASE_URL must be set together"
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkConfig")
            .field("file_api_url", &self.file_api_url)
            .field("authorization", &self.authorization.as_ref().map(|_| "***"))
            .field("bucket_file_path", &self.bucket_file_path)
            .field("bucket_type", &self.bucket_type)
            .field("name_probe_limit", &self.name_probe_limit)
            .field("upload_concurrency", &self.upload_concurrency)
            .field("http_timeout", &self.http_timeout)
            .field("local_storage_path", &self.local_storage_path)
            .field("local_storage_base_url", &self.local_storage_base_url)
            .finish()
    }
}
