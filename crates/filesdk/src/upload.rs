use std::path::Path;
use std::time::Instant;

use bytes::Bytes;
use filesdk_core::{
    CommandKind, CredentialRequest, FileRecord, QualitySet, SdkError, SdkResult, StoredVariant,
    UploadOptions,
};
use filesdk_processing::{resolve_mime_type, CompressionOutcome, EncodedVariant};
use filesdk_storage::{variant_object_name, AdapterProbe};
use futures::{StreamExt, TryStreamExt};

use crate::FileSdk;

impl FileSdk {
    /// Store `data` and its variants, then persist the metadata record.
    ///
    /// Objects already written stay in place when a later step fails.
    pub async fn upload_from_bytes(&self, data: Bytes, options: UploadOptions) -> SdkResult<FileRecord> {
        self.upload(data, options)
            .await
            .inspect_err(|e| e.log("upload"))
    }

    /// Read a local file and upload it. The object name defaults to the file
    /// name.
    pub async fn upload_from_local_path(
        &self,
        path: impl AsRef<Path>,
        mut options: UploadOptions,
    ) -> SdkResult<FileRecord> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read upload source");
        })?;

        if options.name.is_none() {
            options.name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
        }

        self.upload_from_bytes(Bytes::from(data), options).await
    }

    async fn upload(&self, data: Bytes, options: UploadOptions) -> SdkResult<FileRecord> {
        let start = Instant::now();
        let qualities = QualitySet::from_values(&options.qualities)?;
        let authorization = self.authorization(options.authorization.as_deref());
        let path_hint = options
            .path
            .as_deref()
            .or(self.config.bucket_file_path.as_deref());

        let command = if options.is_update {
            CommandKind::Update
        } else {
            CommandKind::Create
        };
        let credential = self
            .credential(CredentialRequest {
                command,
                backend_kind: options.backend_kind.or(self.config.bucket_type),
                path: path_hint,
                authorization,
            })
            .await?;
        let adapter = self.registry.get(credential.backend_kind)?;

        let object_path = credential
            .object_path(path_hint)
            .unwrap_or_else(|| self.config.default_namespace().to_string());

        let probe = AdapterProbe {
            adapter: adapter.as_ref(),
            credential: &credential,
            object_path: &object_path,
        };
        let base_name = self
            .resolver
            .resolve(options.name.as_deref(), options.is_update, &object_path, &probe)
            .await?;

        let expansion = self.engine.expand(data.clone(), &qualities).await;
        if let CompressionOutcome::Skipped(reason) = &expansion.outcome {
            if qualities.len() > 1 {
                tracing::warn!(name = %base_name, reason = %reason, "Compression skipped, storing original only");
            }
        }

        let mime_type = resolve_mime_type(
            expansion.mime_type.as_deref(),
            options.mime_type.as_deref(),
            &data,
        );

        let variants: Vec<StoredVariant> = futures::stream::iter(expansion.variants)
            .map(|EncodedVariant { quality, bytes }| {
                let object_name = variant_object_name(&base_name, quality);
                let adapter = adapter.clone();
                let credential = &credential;
                let object_path = object_path.as_str();
                let mime_type = mime_type.as_str();
                async move {
                    let url = adapter
                        .put(credential, object_path, &object_name, bytes, mime_type)
                        .await
                        .map_err(|e| {
                            tracing::error!(
                                backend = %adapter.kind(),
                                path = %object_path,
                                key = %object_name,
                                error = %e,
                                "Variant upload failed"
                            );
                            SdkError::from(e)
                        })?;
                    Ok::<_, SdkError>(StoredVariant {
                        quality,
                        url,
                        object_path: object_path.to_string(),
                        object_name,
                    })
                }
            })
            .buffered(self.config.upload_concurrency.max(1))
            .try_collect()
            .await?;

        let record = FileRecord::assemble(
            credential.backend_kind,
            &object_path,
            &base_name,
            data.len() as u64,
            &mime_type,
            variants,
            options.extras,
        )?;

        let stored = self.metadata.create(&record, authorization).await?;

        tracing::info!(
            id = %stored.id_or_name(),
            backend = %stored.backend_kind,
            path = %stored.base_path,
            name = %stored.name,
            variants = stored.variants.len(),
            size_bytes = stored.byte_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File uploaded"
        );

        Ok(stored)
    }
}
