use crate::traits::{StorageAdapter, StorageError, StorageResult};
use crate::BackendKind;
use async_trait::async_trait;
use bytes::Bytes;
use filesdk_core::ScopedCredential;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem adapter
///
/// Object paths map to directories below `base_path`, object names to files in
/// them. Credentials are accepted but not checked: the filesystem has no
/// notion of a scoped grant.
#[derive(Clone)]
pub struct LocalAdapter {
    base_path: PathBuf,
    base_url: String,
}

impl LocalAdapter {
    /// Create a new LocalAdapter
    ///
    /// # Arguments
    /// * `base_path` - Root directory for stored objects (e.g., "/var/lib/filesdk")
    /// * `base_url` - Base URL the root is served under (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalAdapter {
            base_path,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve `(object_path, object_name)` to a file below the root.
    ///
    /// Only plain relative segments are accepted, so nothing can escape
    /// `base_path`.
    fn object_file(&self, object_path: &str, object_name: &str) -> StorageResult<PathBuf> {
        if object_name.is_empty() || object_name.contains('/') || object_name.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "invalid object name {:?}",
                object_name
            )));
        }

        let relative = Path::new(object_path.trim_matches('/')).join(object_name);
        let mut path = self.base_path.clone();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                _ => {
                    return Err(StorageError::InvalidKey(format!(
                        "{}/{} resolves outside storage directory",
                        object_path, object_name
                    )))
                }
            }
        }

        Ok(path)
    }

    fn object_url(&self, object_path: &str, object_name: &str) -> String {
        let path = object_path.trim_matches('/');
        if path.is_empty() {
            format!("{}/{}", self.base_url, urlencoding::encode(object_name))
        } else {
            format!(
                "{}/{}/{}",
                self.base_url,
                path.split('/')
                    .map(|s| urlencoding::encode(s).into_owned())
                    .collect::<Vec<_>>()
                    .join("/"),
                urlencoding::encode(object_name)
            )
        }
    }
}

fn staging_file(path: &Path, object_name: &str) -> PathBuf {
    path.with_file_name(format!(".{}.{}.tmp", object_name, uuid::Uuid::new_v4()))
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl StorageAdapter for LocalAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn put(
        &self,
        _credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.object_file(object_path, object_name)?;
        let size = data.len();
        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::NamespaceFailed(format!("{}: {}", parent.display(), e))
            })?;
        }

        // Staged beside the target, then renamed over it.
        let staging = staging_file(&path, object_name);
        let written = match write_synced(&staging, &data).await {
            Ok(()) => fs::rename(&staging, &path).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to move file into {}: {}", path.display(), e))
            }),
            Err(e) => Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            ))),
        };
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                tracing::debug!(path = %staging.display(), error = %cleanup, "Staging file not removed");
            }
            return Err(e);
        }

        tracing::info!(
            path = %path.display(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(self.object_url(object_path, object_name))
    }

    async fn delete_if_exists(
        &self,
        _credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<()> {
        let path = self.object_file(object_path, object_name)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(
        &self,
        _credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<bool> {
        let path = self.object_file(object_path, object_name)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn credential() -> ScopedCredential {
        ScopedCredential::new(BackendKind::Local, "unused")
    }

    async fn adapter(dir: &Path) -> LocalAdapter {
        LocalAdapter::new(dir, "http://localhost:3000/media/")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_url() {
        let dir = tempdir().unwrap();
        let storage = adapter(dir.path()).await;

        let url = storage
            .put(&credential(), "photos", "cat.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/photos/cat.png");
        let written = std::fs::read(dir.path().join("photos").join("cat.png")).unwrap();
        assert_eq!(written, b"png");
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn overwrite_replaces_content_without_leftovers() {
        let dir = tempdir().unwrap();
        let storage = adapter(dir.path()).await;
        let cred = credential();

        storage
            .put(&cred, "photos", "cat.png", Bytes::from_static(b"first"), "image/png")
            .await
            .unwrap();
        storage
            .put(&cred, "photos", "cat.png", Bytes::from_static(b"second"), "image/png")
            .await
            .unwrap();

        let photos = dir.path().join("photos");
        assert_eq!(std::fs::read(photos.join("cat.png")).unwrap(), b"second");
        assert_eq!(entries(&photos), vec!["cat.png".to_string()]);
    }

    #[tokio::test]
    async fn failed_put_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let storage = adapter(dir.path()).await;
        let photos = dir.path().join("photos");
        // A directory in the way makes the final rename fail after the data was written.
        std::fs::create_dir_all(photos.join("cat.png").join("inner")).unwrap();

        let result = storage
            .put(&credential(), "photos", "cat.png", Bytes::from_static(b"png"), "image/png")
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert_eq!(entries(&photos), vec!["cat.png".to_string()]);
        assert!(photos.join("cat.png").is_dir());
    }

    #[tokio::test]
    async fn url_encodes_object_names() {
        let dir = tempdir().unwrap();
        let storage = adapter(dir.path()).await;

        let url = storage
            .put(&credential(), "photos", "my cat@50pc.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/media/photos/my%20cat%4050pc.png");
    }

    #[tokio::test]
    async fn exists_and_delete() {
        let dir = tempdir().unwrap();
        let storage = adapter(dir.path()).await;
        let cred = credential();

        assert!(!storage.exists(&cred, "docs", "a.txt").await.unwrap());
        storage
            .put(&cred, "docs", "a.txt", Bytes::from_static(b"a"), "text/plain")
            .await
            .unwrap();
        assert!(storage.exists(&cred, "docs", "a.txt").await.unwrap());

        storage.delete_if_exists(&cred, "docs", "a.txt").await.unwrap();
        assert!(!storage.exists(&cred, "docs", "a.txt").await.unwrap());

        // Already gone
        storage.delete_if_exists(&cred, "docs", "a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = adapter(dir.path()).await;
        let cred = credential();

        let result = storage.exists(&cred, "../../etc", "passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete_if_exists(&cred, "docs", "../secret").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .put(&cred, "docs", "", Bytes::new(), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
