#[cfg(feature = "storage-azure")]
use crate::AzureBlobAdapter;
#[cfg(feature = "storage-local")]
use crate::LocalAdapter;
#[cfg(feature = "storage-s3")]
use crate::S3Adapter;
use crate::{StorageAdapter, StorageResult};
#[cfg(feature = "storage-local")]
use crate::StorageError;
use filesdk_core::{BackendKind, SdkConfig, SdkError};
use std::collections::HashMap;
use std::sync::Arc;

/// Adapters keyed by backend kind, built once at startup.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<BackendKind, Arc<dyn StorageAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own kind, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn StorageAdapter>) -> &mut Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn with(mut self, adapter: Arc<dyn StorageAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Adapter for `kind`, or `UnsupportedBackend` when none is registered.
    pub fn get(&self, kind: BackendKind) -> Result<Arc<dyn StorageAdapter>, SdkError> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| SdkError::UnsupportedBackend(kind.to_string()))
    }

    pub fn kinds(&self) -> Vec<BackendKind> {
        let mut kinds: Vec<_> = self.adapters.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}

/// Create the registry of every backend compiled into this build.
///
/// The local adapter is only registered when a local storage path is
/// configured.
pub async fn create_registry(config: &SdkConfig) -> StorageResult<AdapterRegistry> {
    let mut registry = AdapterRegistry::new();

    #[cfg(feature = "storage-azure")]
    registry.register(Arc::new(AzureBlobAdapter::new(config.http_timeout)?));

    #[cfg(feature = "storage-s3")]
    registry.register(Arc::new(S3Adapter::new()));

    #[cfg(feature = "storage-local")]
    {
        if let Some(base_path) = config.local_storage_path.clone() {
            let base_url = config.local_storage_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            registry.register(Arc::new(LocalAdapter::new(base_path, base_url).await?));
        }
    }

    tracing::debug!(backends = ?registry.kinds(), "Storage adapters registered");

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn google_is_not_registered() {
        let config = SdkConfig::new("http://localhost:3000");
        let registry = create_registry(&config).await.unwrap();

        let err = registry.get(BackendKind::Google).err().unwrap();
        assert!(matches!(err, SdkError::UnsupportedBackend(ref k) if k == "google"));
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn local_registered_only_when_configured() {
        let config = SdkConfig::new("http://localhost:3000");
        let registry = create_registry(&config).await.unwrap();
        assert!(registry.get(BackendKind::Local).is_err());

        let dir = tempfile::tempdir().unwrap();
        let config = SdkConfig::new("http://localhost:3000")
            .with_local_storage(dir.path(), "http://localhost:3000/media");
        let registry = create_registry(&config).await.unwrap();
        assert_eq!(registry.get(BackendKind::Local).unwrap().kind(), BackendKind::Local);
    }

    #[cfg(all(feature = "storage-azure", feature = "storage-s3"))]
    #[tokio::test]
    async fn registers_compiled_backends() {
        let config = SdkConfig::new("http://localhost:3000");
        let registry = create_registry(&config).await.unwrap();
        assert_eq!(registry.kinds(), vec![BackendKind::Aws, BackendKind::Azure]);
    }
}
