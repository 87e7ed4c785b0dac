#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{ArtifactStore, StorageBackend, StorageError, StorageResult};
use placement_core::Config;
use std::sync::Arc;

fn required(value: Option<&str>, name: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", name)))
}

#[cfg(feature = "storage-s3")]
async fn s3_store(config: &Config) -> StorageResult<Arc<dyn ArtifactStore>> {
    let bucket = required(config.s3_bucket(), "S3_BUCKET")?;
    let region = required(config.s3_region().or(config.aws_region()), "S3_REGION or AWS_REGION")?;
    let endpoint = config.s3_endpoint().map(String::from);
    Ok(Arc::new(S3Storage::new(bucket, region, endpoint).await?))
}

#[cfg(not(feature = "storage-s3"))]
async fn s3_store(_config: &Config) -> StorageResult<Arc<dyn ArtifactStore>> {
    Err(StorageError::ConfigError(
        "this build has no S3 support (enable the storage-s3 feature)".to_string(),
    ))
}

#[cfg(feature = "storage-local")]
async fn local_store(config: &Config) -> StorageResult<Arc<dyn ArtifactStore>> {
    let root = required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?;
    let base_url = required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?;
    Ok(Arc::new(LocalStorage::new(root, base_url).await?))
}

#[cfg(not(feature = "storage-local"))]
async fn local_store(_config: &Config) -> StorageResult<Arc<dyn ArtifactStore>> {
    Err(StorageError::ConfigError(
        "this build has no local storage support (enable the storage-local feature)".to_string(),
    ))
}

/// Build the artifact store selected by `STORAGE_BACKEND` (local when unset).
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn ArtifactStore>> {
    let backend = config.storage_backend().unwrap_or(StorageBackend::Local);
    tracing::info!(backend = %backend, "Initializing artifact storage");
    match backend {
        StorageBackend::S3 => s3_store(config).await,
        StorageBackend::Local => local_store(config).await,
    }
}
