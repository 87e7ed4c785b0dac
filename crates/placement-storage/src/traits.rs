//! Storage abstraction trait
//!
//! This module defines the ArtifactStore trait that all storage backends must implement.

use crate::{StagedFile, StorageBackend, StoredArtifact};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Artifact already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked artifact contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Permanent storage for published artifacts.
///
/// Both backends (S3, local filesystem) implement this trait so the publish
/// pipeline never branches on where files end up.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Move a staged file to `key` and return its locator.
    ///
    /// The staged file is consumed whatever the outcome: on success it has become
    /// the artifact, on failure it has been removed. An existing object at `key`
    /// is never overwritten: that case is `StorageError::AlreadyExists`.
    async fn store(&self, staged: StagedFile, key: &str) -> StorageResult<StoredArtifact>;

    /// Delete the artifact at `key`. A missing artifact is `StorageError::NotFound`.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Stream the artifact at `key`. A missing artifact is `StorageError::NotFound`.
    async fn open(&self, key: &str) -> StorageResult<ByteStream>;

    fn backend_type(&self) -> StorageBackend;
}
