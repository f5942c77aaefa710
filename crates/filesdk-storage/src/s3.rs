use crate::traits::{StorageAdapter, StorageError, StorageResult};
use crate::BackendKind;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;
use bytes::Bytes;
use filesdk_core::ScopedCredential;

const DEFAULT_REGION: &str = "us-east-1";

/// S3 adapter
///
/// Clients are built per call from the scoped credential: `secret` is the
/// secret access key, the key id, session token, region and optional
/// S3-compatible endpoint come from the credential hints. Object paths are
/// bucket names.
#[derive(Clone, Default)]
pub struct S3Adapter;

/// Connection settings extracted from a credential.
#[derive(Debug, Clone, PartialEq)]
struct S3Settings {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    region: String,
    endpoint: Option<String>,
}

impl S3Settings {
    fn from_credential(credential: &ScopedCredential) -> StorageResult<Self> {
        let access_key_id = credential
            .hints
            .access_key_id
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                StorageError::ConfigError("S3 credential is missing accessKeyId".to_string())
            })?;

        Ok(S3Settings {
            access_key_id,
            secret_access_key: credential.secret.clone(),
            session_token: credential.hints.session_token.clone(),
            region: credential
                .hints
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: credential
                .hints
                .endpoint
                .as_ref()
                .map(|e| e.trim_end_matches('/').to_string()),
        })
    }

    /// Public URL of an object. Custom endpoints use path-style addressing.
    fn object_url(&self, bucket: &str, key: &str) -> String {
        let key = urlencoding::encode(key);
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint, bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key),
        }
    }
}

impl S3Adapter {
    pub fn new() -> Self {
        S3Adapter
    }

    async fn client(settings: &S3Settings) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(Credentials::new(
                settings.access_key_id.clone(),
                settings.secret_access_key.clone(),
                settings.session_token.clone(),
                None,
                "filesdk-scoped",
            ));
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(settings.endpoint.is_some())
            .build();

        Client::from_conf(s3_config)
    }

    /// Make sure the bucket exists, creating it when missing.
    async fn ensure_bucket(client: &Client, settings: &S3Settings, bucket: &str) -> StorageResult<()> {
        match client.head_bucket().bucket(bucket).send().await {
            Ok(_) => return Ok(()),
            Err(e) => {
                let status = e.raw_response().map(|r| r.status().as_u16());
                if !matches!(status, Some(404)) && !is_not_found(&e) {
                    return Err(classify(e, StorageError::NamespaceFailed));
                }
            }
        }

        let mut request = client.create_bucket().bucket(bucket);
        if settings.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(settings.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => {
                tracing::info!(bucket = %bucket, "S3 bucket created");
                Ok(())
            }
            Err(e) => {
                let service_error = e.as_service_error();
                if service_error.is_some_and(|s| {
                    s.is_bucket_already_owned_by_you() || s.is_bucket_already_exists()
                }) {
                    Ok(())
                } else {
                    Err(classify(e, StorageError::NamespaceFailed))
                }
            }
        }
    }
}

fn is_not_found(
    err: &SdkError<aws_sdk_s3::operation::head_bucket::HeadBucketError>,
) -> bool {
    err.as_service_error().is_some_and(|s| s.is_not_found())
}

/// Map an SDK error, keeping rejected credentials distinguishable.
fn classify<E>(err: SdkError<E>, make: fn(String) -> StorageError) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let message = DisplayErrorContext(&err).to_string();
    match status {
        Some(401) | Some(403) => StorageError::Unauthorized(message),
        _ => make(message),
    }
}

#[async_trait]
impl StorageAdapter for S3Adapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Aws
    }

    async fn put(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        let settings = S3Settings::from_credential(credential)?;
        let client = Self::client(&settings).await;
        let size = data.len();
        let start = std::time::Instant::now();

        Self::ensure_bucket(&client, &settings, object_path).await?;

        client
            .put_object()
            .bucket(object_path)
            .key(object_name)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| classify(e, StorageError::UploadFailed))?;

        tracing::info!(
            bucket = %object_path,
            key = %object_name,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 put successful"
        );

        Ok(settings.object_url(object_path, object_name))
    }

    async fn delete_if_exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<()> {
        let settings = S3Settings::from_credential(credential)?;
        let client = Self::client(&settings).await;

        // DeleteObject is idempotent on S3: a missing key is not an error.
        match client
            .delete_object()
            .bucket(object_path)
            .key(object_name)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.raw_response().is_some_and(|r| r.status().as_u16() == 404) => Ok(()),
            Err(e) => Err(classify(e, StorageError::DeleteFailed)),
        }
    }

    async fn exists(
        &self,
        credential: &ScopedCredential,
        object_path: &str,
        object_name: &str,
    ) -> StorageResult<bool> {
        let settings = S3Settings::from_credential(credential)?;
        let client = Self::client(&settings).await;

        match client
            .head_object()
            .bucket(object_path)
            .key(object_name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error().is_some_and(|s| s.is_not_found())
                    || e.raw_response().is_some_and(|r| r.status().as_u16() == 404)
                {
                    Ok(false)
                } else {
                    Err(classify(e, StorageError::BackendError))
                }
            }
        }
    }
}
