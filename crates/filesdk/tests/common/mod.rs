//! In-memory collaborators shared by the orchestrator tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use filesdk::{
    AdapterRegistry, BackendHints, BackendKind, CommandKind, CredentialProvider,
    CredentialRequest, FileRecord, FileSdk, MetadataStore, ScopedCredential, SdkConfig, SdkError,
    SdkResult, StorageAdapter, StorageError,
};
use filesdk_storage::StorageResult;

/// Ordered log of side effects across collaborators.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct MemoryAdapter {
    kind: BackendKind,
    journal: Journal,
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    fail_delete: Mutex<HashSet<String>>,
    fail_put: AtomicBool,
    delete_delay: Mutex<Option<Duration>>,
    pub put_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    /// Calls made with a credential that had already expired.
    pub expired_uses: AtomicUsize,
}

impl MemoryAdapter {
    pub fn new(kind: BackendKind, journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            kind,
            journal,
            objects: Mutex::new(HashMap::new()),
            fail_delete: Mutex::new(HashSet::new()),
            fail_put: AtomicBool::new(false),
            delete_delay: Mutex::new(None),
            put_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            expired_uses: AtomicUsize::new(0),
        })
    }

    fn key(path: &str, name: &str) -> String {
        format!("{}/{}", path, name)
    }

    pub fn insert(&self, path: &str, name: &str, data: &'static [u8]) {
        self.objects.lock().unwrap().insert(
            Self::key(path, name),
            (Bytes::from_static(data), "application/octet-stream".to_string()),
        );
    }

    pub fn object(&self, path: &str, name: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(&Self::key(path, name)).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn fail_delete_of(&self, path: &str, name: &str) {
        self.fail_delete.lock().unwrap().insert(Self::key(path, name));
    }

    pub fn fail_puts(&self) {
        self.fail_put.store(true, Ordering::SeqCst);
    }

    pub fn slow_deletes(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }

    fn check_credential(&self, credential: &ScopedCredential) {
        if credential.is_expired_at(Utc::now()) {
            self.expired_uses.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl StorageAdapter for MemoryAdapter {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn put(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credential(credential);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("injected".to_string()));
        }
        let key = Self::key(object_path, object_name);
        self.journal.lock().unwrap().push(format!("put {}", key));
        self.objects
            .lock()
            .unwrap()
            .insert(key.clone(), (data, content_type.to_string()));
        Ok(format!("https://store.test/{}", key))
    }

    async fn delete_if_exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credential(credential);
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let key = Self::key(object_path, object_name);
        self.journal.lock().unwrap().push(format!("delete object {}", key));
        if self.fail_delete.lock().unwrap().contains(&key) {
            return Err(StorageError::DeleteFailed(format!("injected for {}", key)));
        }
        self.objects.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn exists(
        &self,
        _credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<bool> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .contains_key(&Self::key(object_path, object_name)))
    }
}

#[derive(Default)]
pub struct MemoryMetadata {
    journal: Option<Journal>,
    records: Mutex<BTreeMap<String, FileRecord>>,
    next_id: AtomicUsize,
}

impl MemoryMetadata {
    pub fn new(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal: Some(journal),
            ..Default::default()
        })
    }

    fn log(&self, event: String) {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(event);
        }
    }

    pub fn record(&self, id: &str) -> Option<FileRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn missing(id: &str) -> SdkError {
        SdkError::NotFound(format!("file {}", id))
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadata {
    async fn create(&self, record: &FileRecord, _authorization: Option<&str>) -> SdkResult<FileRecord> {
        let id = format!("file-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut stored = record.clone();
        stored.id = Some(id.clone());
        self.log(format!("create record {}", id));
        self.records.lock().unwrap().insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: &str, _authorization: Option<&str>) -> SdkResult<FileRecord> {
        self.record(id).ok_or_else(|| Self::missing(id))
    }

    async fn get_many(&self, ids: &[String], _authorization: Option<&str>) -> SdkResult<Vec<FileRecord>> {
        let records = self.records.lock().unwrap();
        Ok(ids.iter().filter_map(|id| records.get(id).cloned()).collect())
    }

    async fn archive(&self, id: &str, _authorization: Option<&str>) -> SdkResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(id).ok_or_else(|| Self::missing(id))?;
        record.is_archived = true;
        Ok(())
    }

    async fn archive_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<()> {
        for id in ids {
            self.archive(id, authorization).await?;
        }
        Ok(())
    }

    async fn delete(&self, id: &str, _authorization: Option<&str>) -> SdkResult<()> {
        self.log(format!("delete record {}", id));
        self.records
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::missing(id))
    }

    async fn delete_many(&self, ids: &[String], authorization: Option<&str>) -> SdkResult<()> {
        for id in ids {
            self.delete(id, authorization).await?;
        }
        Ok(())
    }
}

/// Hands out a fixed credential and remembers every request.
///
/// With a ttl, every issued copy expires `ttl` after it was handed out.
pub struct StaticCredentials {
    credential: Mutex<ScopedCredential>,
    ttl: Mutex<Option<chrono::Duration>>,
    pub requests: Mutex<Vec<(CommandKind, Option<BackendKind>, Option<String>, Option<String>)>>,
}

impl StaticCredentials {
    pub fn new(credential: ScopedCredential) -> Arc<Self> {
        Arc::new(Self {
            credential: Mutex::new(credential),
            ttl: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn for_kind(kind: BackendKind) -> Arc<Self> {
        Self::new(ScopedCredential::new(kind, "sig=test"))
    }

    pub fn with_container(kind: BackendKind, container: &str) -> Arc<Self> {
        Self::new(ScopedCredential::new(kind, "sig=test").with_hints(BackendHints {
            container_name: Some(container.to_string()),
            ..Default::default()
        }))
    }

    pub fn expire_after(&self, ttl: chrono::Duration) {
        *self.ttl.lock().unwrap() = Some(ttl);
    }

    pub fn replace(&self, credential: ScopedCredential) {
        *self.credential.lock().unwrap() = credential;
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn issue(&self, request: CredentialRequest<'_>) -> SdkResult<ScopedCredential> {
        self.requests.lock().unwrap().push((
            request.command,
            request.backend_kind,
            request.path.map(str::to_string),
            request.authorization.map(str::to_string),
        ));
        let credential = self.credential.lock().unwrap().clone();
        Ok(match *self.ttl.lock().unwrap() {
            Some(ttl) => credential.with_expiry(Utc::now() + ttl),
            None => credential,
        })
    }
}

pub fn config() -> SdkConfig {
    SdkConfig::new("http://files.test").with_authorization("Bearer instance")
}

pub fn sdk(
    adapter: Arc<MemoryAdapter>,
    metadata: Arc<MemoryMetadata>,
    credentials: Arc<StaticCredentials>,
) -> FileSdk {
    FileSdk::new(
        config(),
        credentials,
        metadata,
        AdapterRegistry::new().with(adapter),
    )
}

pub fn png(width: u32, height: u32) -> Bytes {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    Bytes::from(buffer)
}

pub fn dimensions(data: &Bytes) -> (u32, u32) {
    use image::GenericImageView;
    image::load_from_memory(data).unwrap().dimensions()
}
