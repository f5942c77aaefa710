use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use filesdk_core::{
    BackendKind, CommandKind, CredentialRequest, FileRecord, ScopedCredential, SdkError, SdkResult,
};
use filesdk_storage::StorageAdapter;
use futures::StreamExt;

use crate::FileSdk;

/// Per-id failure inside a batch delete.
#[derive(Debug)]
pub struct BatchFailure {
    pub id: String,
    pub error: SdkError,
}

/// Outcome of [`FileSdk::delete_many`].
#[derive(Debug, Default)]
pub struct BatchDeleteReport {
    /// Records hard-deleted together with all of their objects.
    pub deleted: Vec<String>,
    /// Records archived (soft delete).
    pub archived: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl FileSdk {
    /// Archive (`soft`) or permanently delete one file.
    ///
    /// A hard delete removes every stored variant first; the record is only
    /// deleted when all of them are gone, otherwise the call fails with
    /// `VariantsNotDeleted` and the record stays.
    pub async fn delete_one(&self, id: &str, soft: bool, authorization: Option<&str>) -> SdkResult<()> {
        let authorization = self.authorization(authorization);
        let result = if soft {
            self.metadata.archive(id, authorization).await
        } else {
            self.hard_delete(id, authorization).await
        };

        match &result {
            Ok(()) => tracing::info!(id = %id, soft, "File deleted"),
            Err(e) => e.log("delete"),
        }
        result
    }

    /// Archive or permanently delete several files, reporting per id.
    ///
    /// Ids unknown to the metadata service are reported as `NotFound`
    /// failures; one failing file never stops the others.
    pub async fn delete_many(
        &self,
        ids: &[String],
        soft: bool,
        authorization: Option<&str>,
    ) -> SdkResult<BatchDeleteReport> {
        let authorization = self.authorization(authorization);
        let mut report = BatchDeleteReport::default();
        if ids.is_empty() {
            return Ok(report);
        }

        if soft {
            self.metadata
                .archive_many(ids, authorization)
                .await
                .inspect_err(|e| e.log("delete_many"))?;
            report.archived = ids.to_vec();
            tracing::info!(count = ids.len(), "Files archived");
            return Ok(report);
        }

        let records = self
            .metadata
            .get_many(ids, authorization)
            .await
            .inspect_err(|e| e.log("delete_many"))?;
        let mut by_id: HashMap<&str, &FileRecord> = records
            .iter()
            .filter_map(|r| r.id.as_deref().map(|id| (id, r)))
            .collect();

        // One delete credential per backend the batch touches.
        let mut access: HashMap<BackendKind, (ScopedCredential, Arc<dyn StorageAdapter>)> =
            HashMap::new();

        let mut objects_removed = Vec::new();
        for id in ids {
            let Some(record) = by_id.remove(id.as_str()) else {
                report.failed.push(BatchFailure {
                    id: id.clone(),
                    error: SdkError::NotFound(format!("file {}", id)),
                });
                continue;
            };

            // A cached credential may have expired while earlier files were deleted.
            if access
                .get(&record.backend_kind)
                .is_some_and(|(credential, _)| credential.ensure_valid().is_err())
            {
                tracing::debug!(backend = %record.backend_kind, "Delete credential expired, requesting a new one");
                access.remove(&record.backend_kind);
            }

            let (credential, adapter) = match access.entry(record.backend_kind) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match self.backend_access(record, authorization).await {
                    Ok(granted) => entry.insert(granted),
                    Err(error) => {
                        report.failed.push(BatchFailure { id: id.clone(), error });
                        continue;
                    }
                },
            };

            match self.delete_variants(record, credential, adapter.as_ref()).await {
                Ok(()) => objects_removed.push(id.clone()),
                Err(error) => report.failed.push(BatchFailure { id: id.clone(), error }),
            }
        }

        if !objects_removed.is_empty() {
            match self.metadata.delete_many(&objects_removed, authorization).await {
                Ok(()) => report.deleted = objects_removed,
                Err(e) => {
                    e.log("delete_many");
                    let message = e.to_string();
                    report.failed.extend(objects_removed.into_iter().map(|id| BatchFailure {
                        id,
                        error: SdkError::Metadata(message.clone()),
                    }));
                }
            }
        }

        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Batch delete finished"
        );
        Ok(report)
    }

    async fn hard_delete(&self, id: &str, authorization: Option<&str>) -> SdkResult<()> {
        let record = self.metadata.get(id, authorization).await?;
        let (credential, adapter) = self.backend_access(&record, authorization).await?;

        self.delete_variants(&record, &credential, adapter.as_ref())
            .await?;

        self.metadata.delete(id, authorization).await
    }

    /// Delete credential and adapter for the backend a record lives on.
    async fn backend_access(
        &self,
        record: &FileRecord,
        authorization: Option<&str>,
    ) -> SdkResult<(ScopedCredential, Arc<dyn StorageAdapter>)> {
        let credential = self
            .credential(CredentialRequest {
                command: CommandKind::Delete,
                backend_kind: Some(record.backend_kind),
                path: Some(record.base_path.as_str()),
                authorization,
            })
            .await?;

        if credential.backend_kind != record.backend_kind {
            return Err(SdkError::AuthorizationFailed(format!(
                "delete credential issued for {} but file {} is stored on {}",
                credential.backend_kind,
                record.id_or_name(),
                record.backend_kind
            )));
        }

        let adapter = self.registry.get(record.backend_kind)?;
        Ok((credential, adapter))
    }

    /// Attempt every variant delete and aggregate the failures.
    ///
    /// A container named by the delete credential overrides the path stored
    /// on each variant.
    async fn delete_variants(
        &self,
        record: &FileRecord,
        credential: &ScopedCredential,
        adapter: &dyn StorageAdapter,
    ) -> SdkResult<()> {
        let failed: Vec<String> = futures::stream::iter(&record.variants)
            .map(|variant| async move {
                let object_path = credential
                    .object_path(Some(variant.object_path.as_str()))
                    .unwrap_or_else(|| variant.object_path.clone());
                match adapter
                    .delete_if_exists(credential, &object_path, &variant.object_name)
                    .await
                {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::error!(
                            backend = %adapter.kind(),
                            path = %object_path,
                            key = %variant.object_name,
                            error = %e,
                            "Variant delete failed"
                        );
                        Some(format!("{}/{}", object_path, variant.object_name))
                    }
                }
            })
            .buffered(self.config.upload_concurrency.max(1))
            .filter_map(|failed| async move { failed })
            .collect()
            .await;

        if failed.is_empty() {
            Ok(())
        } else {
            Err(SdkError::VariantsNotDeleted {
                id: record.id_or_name().to_string(),
                objects: failed,
            })
        }
    }
}
