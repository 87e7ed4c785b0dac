//! Store wrappers that make inserts or transfers fail or stall.

use async_trait::async_trait;
use placement_core::{Record, StoredArtifact};
use placement_db::{Filter, MemoryDocumentStore, RecordStore, SortKey, StoreError, StoreResult};
use placement_services::{
    ArtifactStore, ByteStream, LocalStorage, StagedFile, StorageBackend, StorageError,
    StorageResult,
};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub enum InsertFault {
    /// Insert returns `StoreError::Unavailable`.
    Unavailable,
    /// Insert lands in the inner store only after the given delay.
    Stall(Duration),
}

pub struct FailingRecordStore {
    pub inner: MemoryDocumentStore,
    fault: InsertFault,
}

impl FailingRecordStore {
    pub fn new(fault: InsertFault) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            fault,
        }
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for FailingRecordStore {
    async fn insert(&self, record: &R) -> StoreResult<()> {
        match self.fault {
            InsertFault::Unavailable => {
                Err(StoreError::Unavailable("connection refused".to_string()))
            }
            InsertFault::Stall(delay) => {
                tokio::time::sleep(delay).await;
                RecordStore::<R>::insert(&self.inner, record).await
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<R>> {
        RecordStore::<R>::find_by_id(&self.inner, id).await
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<R>> {
        RecordStore::<R>::find_one(&self.inner, filter).await
    }

    async fn find_many(&self, filter: &Filter, sort: &[SortKey]) -> StoreResult<Vec<R>> {
        RecordStore::<R>::find_many(&self.inner, filter, sort).await
    }

    async fn update_by_id(&self, record: &R) -> StoreResult<()> {
        RecordStore::<R>::update_by_id(&self.inner, record).await
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        RecordStore::<R>::delete_by_id(&self.inner, id).await
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TransferFault {
    /// Writes half of the file at the key, then reports `UploadFailed`.
    Partial,
    /// Completes the transfer only after the given delay.
    Stall(Duration),
}

/// Local storage whose `store` misbehaves. Every `remove` call is recorded.
pub struct FailingArtifactStore {
    inner: LocalStorage,
    fault: TransferFault,
    removed: Mutex<Vec<String>>,
}

impl FailingArtifactStore {
    pub fn new(inner: LocalStorage, fault: TransferFault) -> Self {
        Self {
            inner,
            fault,
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn removed_keys(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for FailingArtifactStore {
    async fn store(&self, staged: StagedFile, key: &str) -> StorageResult<StoredArtifact> {
        match self.fault {
            TransferFault::Partial => {
                let data = std::fs::read(staged.path())?;
                let dest = self.inner.base_path().join(key);
                std::fs::create_dir_all(dest.parent().unwrap())?;
                std::fs::write(&dest, &data[..data.len() / 2])?;
                staged.discard()?;
                Err(StorageError::UploadFailed("connection reset by peer".to_string()))
            }
            TransferFault::Stall(delay) => {
                tokio::time::sleep(delay).await;
                self.inner.store(staged, key).await
            }
        }
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.removed.lock().unwrap().push(key.to_string());
        self.inner.remove(key).await
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn open(&self, key: &str) -> StorageResult<ByteStream> {
        self.inner.open(key).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
