use std::sync::Arc;

use anyhow::Context;
use filesdk_api_client::FileApiClient;
use filesdk_core::{
    CredentialProvider, CredentialRequest, FileRecord, MetadataStore, ScopedCredential, SdkConfig,
    SdkResult,
};
use filesdk_processing::CompressionEngine;
use filesdk_storage::{create_registry, AdapterRegistry, NameResolver};

/// Entry point for uploads, deletes and lookups.
///
/// Holds its own configuration and collaborators; several instances with
/// different settings can live in one process.
pub struct FileSdk {
    pub(crate) config: SdkConfig,
    pub(crate) credentials: Arc<dyn CredentialProvider>,
    pub(crate) metadata: Arc<dyn MetadataStore>,
    pub(crate) registry: AdapterRegistry,
    pub(crate) engine: CompressionEngine,
    pub(crate) resolver: NameResolver,
}

impl FileSdk {
    pub fn new(
        config: SdkConfig,
        credentials: Arc<dyn CredentialProvider>,
        metadata: Arc<dyn MetadataStore>,
        registry: AdapterRegistry,
    ) -> Self {
        let resolver = NameResolver::new(config.name_probe_limit);
        Self {
            config,
            credentials,
            metadata,
            registry,
            engine: CompressionEngine::new(),
            resolver,
        }
    }

    /// Build an SDK talking to the file API over HTTP with every compiled-in
    /// storage backend.
    pub async fn from_config(config: SdkConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let api = Arc::new(FileApiClient::from_config(&config)?);
        let registry = create_registry(&config)
            .await
            .context("Failed to initialize storage adapters")?;

        tracing::info!(
            file_api_url = %config.file_api_url,
            backends = ?registry.kinds(),
            "File SDK initialized"
        );

        Ok(Self::new(config, api.clone(), api, registry))
    }

    /// Replace the name resolver (probe limit, clock).
    pub fn with_name_resolver(mut self, resolver: NameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Per-call authorization, falling back to the instance default.
    pub(crate) fn authorization<'a>(&'a self, per_call: Option<&'a str>) -> Option<&'a str> {
        per_call.or(self.config.authorization.as_deref())
    }

    /// Ask the issuer for a credential and refuse expired ones.
    pub(crate) async fn credential(&self, request: CredentialRequest<'_>) -> SdkResult<ScopedCredential> {
        let credential = self.credentials.issue(request).await?;
        credential.ensure_valid()?;
        Ok(credential)
    }

    pub async fn get_file(&self, id: &str, authorization: Option<&str>) -> SdkResult<FileRecord> {
        self.metadata
            .get(id, self.authorization(authorization))
            .await
            .inspect_err(|e| e.log("get_file"))
    }

    pub async fn get_files(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<Vec<FileRecord>> {
        self.metadata
            .get_many(ids, self.authorization(authorization))
            .await
            .inspect_err(|e| e.log("get_files"))
    }
}
