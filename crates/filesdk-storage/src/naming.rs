//! Object naming shared by every storage adapter.
//!
//! Two jobs live here:
//!
//! - [`NameResolver`] picks the base object name of an upload. Creates never
//!   reuse an existing name; updates must target an existing one.
//! - [`variant_object_name`] derives the per-quality object names from that
//!   base name: `{stem}{suffix}{.ext}` with the suffix from
//!   [`Quality::suffix`].
//!
//! Uniqueness is enforced only by probing the backend. Two uploads racing for
//! the same name inside the same millisecond can both see it as free; the
//! later write wins. Synthesized names carry a random component so this only
//! matters for caller-chosen names.

use std::sync::Arc;

use async_trait::async_trait;
use filesdk_core::models::split_file_name;
use filesdk_core::{Quality, ScopedCredential, SdkError};

use crate::{StorageAdapter, StorageResult};

/// Read-only existence check used while resolving names.
#[async_trait]
pub trait NameProbe: Send + Sync {
    async fn exists(&self, object_name: &str) -> StorageResult<bool>;
}

/// Probes one namespace of a storage adapter.
pub struct AdapterProbe<'a> {
    pub adapter: &'a dyn StorageAdapter,
    pub credential: &'a ScopedCredential,
    pub object_path: &'a str,
}

#[async_trait]
impl NameProbe for AdapterProbe<'_> {
    async fn exists(&self, object_name: &str) -> StorageResult<bool> {
        self.adapter
            .exists(self.credential, self.object_path, object_name)
            .await
    }
}

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Resolves the base object name of an upload.
#[derive(Clone)]
pub struct NameResolver {
    max_probes: usize,
    clock: Clock,
}

impl NameResolver {
    pub fn new(max_probes: usize) -> Self {
        Self {
            max_probes: max_probes.max(1),
            clock: Arc::new(|| chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Replace the millisecond clock used for timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Resolve the final object name.
    ///
    /// - update: `desired` is required and must exist (`InvalidArgument` /
    ///   `NotFound` otherwise); it is returned unchanged.
    /// - create: `desired`, or a synthesized `{namespace}-{millis}-{random}`
    ///   name, is probed; while taken, `{stem}-{millis}{.ext}` is tried with a
    ///   strictly increasing timestamp. At most `max_probes` names are probed
    ///   before failing with `NameCollision`.
    pub async fn resolve(
        &self,
        desired: Option<&str>,
        is_update: bool,
        namespace: &str,
        probe: &dyn NameProbe,
    ) -> Result<String, SdkError> {
        let desired = desired.map(str::trim).filter(|n| !n.is_empty());

        if is_update {
            let name = desired.ok_or_else(|| {
                SdkError::InvalidArgument("cannot update without an object name".to_string())
            })?;
            if !probe.exists(name).await? {
                return Err(SdkError::NotFound(format!("cannot find object {}", name)));
            }
            return Ok(name.to_string());
        }

        let base = match desired {
            Some(name) => name.to_string(),
            None => self.synthesize(namespace),
        };
        let (stem, extension) = split_file_name(&base);

        let mut candidate = base.clone();
        let mut last_millis = i64::MIN;
        for attempt in 1..=self.max_probes {
            if !probe.exists(&candidate).await? {
                if attempt > 1 {
                    tracing::debug!(
                        requested = %base,
                        resolved = %candidate,
                        attempts = attempt,
                        "Object name taken, using timestamped name"
                    );
                }
                return Ok(candidate);
            }

            let millis = (self.clock)().max(last_millis.saturating_add(1));
            last_millis = millis;
            candidate = match extension {
                Some(ext) => format!("{}-{}.{}", stem, millis, ext),
                None => format!("{}-{}", stem, millis),
            };
        }

        tracing::warn!(
            requested = %base,
            attempts = self.max_probes,
            "No free object name found"
        );
        Err(SdkError::NameCollision {
            name: base,
            attempts: self.max_probes,
        })
    }

    /// `{namespace}-{millis}-{random}` without extension.
    pub fn synthesize(&self, namespace: &str) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", namespace, (self.clock)(), &random[..12])
    }
}

/// Object name of one variant: `{stem}{suffix}{.ext}`.
pub fn variant_object_name(base_name: &str, quality: Quality) -> String {
    let (stem, extension) = split_file_name(base_name);
    match extension {
        Some(ext) => format!("{}{}.{}", stem, quality.suffix(), ext),
        None => format!("{}{}", stem, quality.suffix()),
    }
}

/// Recover the quality encoded in a variant object name.
///
/// Names without a quality suffix are originals.
pub fn quality_from_object_name(object_name: &str) -> Option<Quality> {
    let (stem, _) = split_file_name(object_name);
    match stem.rfind('@') {
        Some(idx) => Quality::from_suffix(&stem[idx..]).or(Some(Quality::ORIGINAL)),
        None => Some(Quality::ORIGINAL),
    }
}
