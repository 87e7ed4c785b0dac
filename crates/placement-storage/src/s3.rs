use crate::keys::validate_key;
use crate::traits::{ArtifactStore, ByteStream, StorageError, StorageResult};
use crate::{StagedFile, StorageBackend, StoredArtifact};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use std::time::Instant;

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Artifacts in an S3 (or S3-compatible) bucket.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Credentials come from the standard AWS environment variables. A custom
    /// `endpoint_url` (MinIO, R2, ...) switches to path-style URLs.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Public URL of an object. Path-style for custom endpoints, virtual-hosted for AWS.
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    async fn head_exists(&self, location: &Path) -> StorageResult<bool> {
        match self.store.head(location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3Storage {
    async fn store(&self, staged: StagedFile, key: &str) -> StorageResult<StoredArtifact> {
        validate_key(key)?;
        let location = Path::from(key.to_string());

        if self.head_exists(&location).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }

        let data = tokio::fs::read(staged.path()).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read staged file: {}", e))
        })?;
        let size = data.len() as u64;
        let start = Instant::now();

        let put = self
            .store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await;
        if let Err(e) = put {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = elapsed_ms(start),
                "Artifact upload to S3 failed"
            );
            return Err(StorageError::UploadFailed(e.to_string()));
        }

        if let Err(e) = staged.discard() {
            tracing::warn!(error = %e, key = %key, "Failed to remove staged file after upload");
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = elapsed_ms(start),
            "Artifact stored in S3"
        );

        Ok(StoredArtifact {
            key: key.to_string(),
            location: self.generate_url(key),
            backend: StorageBackend::S3,
        })
    }

    async fn remove(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;
        let start = Instant::now();
        let location = Path::from(storage_key.to_string());

        // S3 deletes are idempotent, so a missing object has to be detected up front
        if !self.head_exists(&location).await? {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        self.store.delete(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = elapsed_ms(start),
                "Artifact delete from S3 failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = elapsed_ms(start),
            "Artifact removed from S3"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        self.head_exists(&Path::from(storage_key.to_string())).await
    }

    async fn open(&self, storage_key: &str) -> StorageResult<ByteStream> {
        validate_key(storage_key)?;
        let start = Instant::now();
        let location = Path::from(storage_key.to_string());

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bucket = self.bucket.clone();
        let key = storage_key.to_string();

        let stream = result.into_stream().map(move |res| {
            res.map_err(|e| {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    duration_ms = elapsed_ms(start),
                    "Artifact stream from S3 failed"
                );
                StorageError::DownloadFailed(e.to_string())
            })
        });

        Ok(Box::pin(stream))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
