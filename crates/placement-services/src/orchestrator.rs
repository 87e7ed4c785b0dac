//! Publish orchestrator: moves staged uploads into permanent storage and
//! persists the records that reference them, cleaning up after any failure.

use crate::error::PublishError;
use crate::notify::{NotificationOutbox, Notify};
use chrono::Utc;
use placement_core::{Attachment, Config, EntitySchema, FormFields, Record, Submission};
use placement_db::{Filter, RecordStore, StoreError};
use placement_storage::{
    artifact_key, ArtifactStore, ByteStream, StagedFile, StorageError, StorageResult, StoredArtifact,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use uuid::Uuid;

/// Permanent-storage folder per entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFolders {
    pub resources: String,
    pub projects: String,
}

impl Default for StorageFolders {
    fn default() -> Self {
        Self {
            resources: "resources".to_string(),
            projects: "projects".to_string(),
        }
    }
}

impl StorageFolders {
    pub fn for_schema(&self, schema: EntitySchema) -> Option<&str> {
        match schema {
            EntitySchema::Resource => Some(&self.resources),
            EntitySchema::ShowcaseProject => Some(&self.projects),
            EntitySchema::AlumniExperience => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub folders: StorageFolders,
    pub transfer_timeout: Duration,
    pub persist_timeout: Duration,
}

impl PublishSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            folders: StorageFolders {
                resources: config.resource_folder().to_string(),
                projects: config.project_folder().to_string(),
            },
            transfer_timeout: config.transfer_timeout(),
            persist_timeout: config.persist_timeout(),
        }
    }
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            folders: StorageFolders::default(),
            transfer_timeout: Duration::from_secs(60),
            persist_timeout: Duration::from_secs(10),
        }
    }
}

/// A record together with an open stream of its artifact.
pub struct ResolvedArtifact<R> {
    pub record: R,
    pub attachment: Attachment,
    pub body: ByteStream,
}

fn store_error(err: StoreError) -> PublishError {
    match err {
        StoreError::NotFound(id) => PublishError::NotFound(format!("Record {}", id)),
        other => PublishError::Persistence(other.to_string()),
    }
}

/// Best-effort removal of an artifact no record will reference.
async fn remove_unreferenced(storage: &dyn ArtifactStore, key: &str, reason: &str) {
    match storage.remove(key).await {
        Ok(()) => tracing::info!(storage_key = %key, reason = reason, "Removed unreferenced artifact"),
        Err(e) if e.is_not_found() => {
            tracing::debug!(storage_key = %key, reason = reason, "No artifact to remove")
        }
        Err(e) => tracing::error!(
            error = %e,
            storage_key = %key,
            reason = reason,
            "Failed to remove unreferenced artifact"
        ),
    }
}

fn discard_staged(staged: StagedFile) {
    let stored_name = staged.stored_name().to_string();
    if let Err(e) = staged.discard() {
        tracing::warn!(error = %e, stored_name = %stored_name, "Failed to remove staged file");
    }
}

#[derive(Clone)]
pub struct PublishOrchestrator {
    storage: Arc<dyn ArtifactStore>,
    settings: PublishSettings,
    outbox: Option<NotificationOutbox>,
}

impl PublishOrchestrator {
    pub fn new(storage: Arc<dyn ArtifactStore>, settings: PublishSettings) -> Self {
        Self {
            storage,
            settings,
            outbox: None,
        }
    }

    pub fn with_notifications(mut self, outbox: NotificationOutbox) -> Self {
        self.outbox = Some(outbox);
        self
    }

    pub fn storage(&self) -> &Arc<dyn ArtifactStore> {
        &self.storage
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Validate metadata, move the staged file to permanent storage and persist
    /// the record. On failure the staged file is gone and no artifact is left
    /// without a record (best effort; compensation failures are logged).
    #[tracing::instrument(
        skip_all,
        fields(entity = R::SCHEMA.name(), stored_name = %staged.stored_name(), size_bytes = staged.size_bytes())
    )]
    pub async fn publish<R>(
        &self,
        records: &dyn RecordStore<R>,
        staged: StagedFile,
        input: &FormFields,
    ) -> Result<R, PublishError>
    where
        R: Submission + Notify,
    {
        let schema = R::SCHEMA;
        let folder = match self.settings.folders.for_schema(schema) {
            Some(folder) if schema.requires_artifact() => folder,
            _ => {
                discard_staged(staged);
                return Err(PublishError::InvalidInput(format!(
                    "{} submissions do not take a file",
                    schema.name()
                )));
            }
        };

        let fields = match schema.validate(input) {
            Ok(fields) => fields,
            Err(violations) => {
                tracing::info!(invalid_fields = ?violations.fields(), "Rejected submission metadata");
                discard_staged(staged);
                return Err(violations.into());
            }
        };

        let key = match artifact_key(folder, staged.stored_name()) {
            Ok(key) => key,
            Err(e) => {
                discard_staged(staged);
                return Err(PublishError::StorageTransfer(e.to_string()));
            }
        };

        let original_name = staged.original_name().to_string();
        let stored_name = staged.stored_name().to_string();
        let mime_type = staged.mime_type().to_string();
        let size_bytes = staged.size_bytes();

        let start = Instant::now();
        let storage = Arc::clone(&self.storage);
        let transfer_key = key.clone();
        let mut transfer = Box::pin(async move { storage.store(staged, &transfer_key).await });

        let artifact = match timeout(self.settings.transfer_timeout, transfer.as_mut()).await {
            Ok(Ok(artifact)) => artifact,
            Ok(Err(StorageError::AlreadyExists(_))) => {
                // the existing object belongs to another record; leave it alone
                tracing::error!(storage_key = %key, "Storage key already taken");
                return Err(PublishError::StorageTransfer(format!(
                    "An artifact already exists at {}",
                    key
                )));
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, storage_key = %key, "Transfer to permanent storage failed");
                self.remove_artifact(&key, "partial transfer").await;
                return Err(PublishError::StorageTransfer(e.to_string()));
            }
            Err(_) => {
                tracing::error!(
                    storage_key = %key,
                    timeout_secs = self.settings.transfer_timeout.as_secs_f64(),
                    "Transfer to permanent storage timed out"
                );
                self.settle_late_transfer(transfer, key);
                return Err(PublishError::StorageTransfer(format!(
                    "Timed out after {:?}",
                    self.settings.transfer_timeout
                )));
            }
        };

        tracing::debug!(
            storage_key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Artifact transferred"
        );

        let attachment = Attachment {
            original_name,
            stored_name,
            mime_type,
            size_bytes,
            storage: artifact,
        };

        let record = match R::assemble(&fields, Some(attachment), Utc::now()) {
            Ok(record) => record,
            Err(violations) => {
                self.remove_artifact(&key, "record could not be built").await;
                return Err(violations.into());
            }
        };

        self.persist(records, record, Some(&key)).await
    }

    /// Validate and persist a submission that carries no file.
    #[tracing::instrument(skip_all, fields(entity = R::SCHEMA.name()))]
    pub async fn submit<R>(
        &self,
        records: &dyn RecordStore<R>,
        input: &FormFields,
    ) -> Result<R, PublishError>
    where
        R: Submission + Notify,
    {
        if R::SCHEMA.requires_artifact() {
            return Err(PublishError::MissingFile);
        }

        let fields = R::SCHEMA.validate(input)?;
        let record = R::assemble(&fields, None, Utc::now())?;
        self.persist(records, record, None).await
    }

    async fn persist<R>(
        &self,
        records: &dyn RecordStore<R>,
        record: R,
        artifact: Option<&str>,
    ) -> Result<R, PublishError>
    where
        R: Submission + Notify,
    {
        let deadline = self.settings.persist_timeout;

        let failure = match timeout(deadline, records.insert(&record)).await {
            Ok(Ok(())) => {
                tracing::info!(
                    record_id = %record.id(),
                    collection = R::COLLECTION,
                    "Record published"
                );
                if let Some(outbox) = &self.outbox {
                    outbox.enqueue(record.notification());
                }
                return Ok(record);
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, record_id = %record.id(), "Failed to persist record");
                PublishError::Persistence(e.to_string())
            }
            Err(_) => {
                tracing::error!(
                    record_id = %record.id(),
                    timeout_secs = deadline.as_secs_f64(),
                    "Persisting record timed out"
                );
                // the insert may still have landed after the deadline
                match timeout(deadline, records.delete_by_id(record.id())).await {
                    Ok(Ok(true)) => {
                        tracing::warn!(record_id = %record.id(), "Removed record inserted after timeout")
                    }
                    Ok(Ok(false)) => {}
                    Ok(Err(e)) => {
                        tracing::error!(error = %e, record_id = %record.id(), "Failed to remove possibly inserted record")
                    }
                    Err(_) => {
                        tracing::error!(record_id = %record.id(), "Timed out removing possibly inserted record")
                    }
                }
                PublishError::Persistence(format!("Timed out after {:?}", deadline))
            }
        };

        if let Some(key) = artifact {
            self.remove_artifact(key, "record was not persisted").await;
        }
        Err(failure)
    }

    async fn remove_artifact(&self, key: &str, reason: &str) {
        remove_unreferenced(self.storage.as_ref(), key, reason).await;
    }

    /// Let a timed-out transfer run to completion in the background, then remove
    /// whatever it left at `key`.
    fn settle_late_transfer<F>(&self, transfer: F, key: String)
    where
        F: Future<Output = StorageResult<StoredArtifact>> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            let reason = match transfer.await {
                Ok(_) => "transfer finished after timeout",
                Err(StorageError::AlreadyExists(_)) => return,
                Err(_) => "partial transfer after timeout",
            };
            remove_unreferenced(storage.as_ref(), &key, reason).await;
        });
    }

    /// Delete a record and its artifact. A failure to remove the artifact
    /// (including one that is already gone) is logged and does not stop the delete.
    #[tracing::instrument(skip(self, records), fields(collection = R::COLLECTION))]
    pub async fn retract<R: Record>(
        &self,
        records: &dyn RecordStore<R>,
        id: Uuid,
    ) -> Result<R, PublishError> {
        let record = records
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| PublishError::NotFound(format!("Record {}", id)))?;

        if let Some(key) = record.storage_key() {
            if let Err(e) = self.storage.remove(key).await {
                let missing = e.is_not_found();
                let err = PublishError::Retract(e.to_string());
                if missing {
                    tracing::warn!(error = %err, storage_key = %key, "Artifact already missing during retract");
                } else {
                    tracing::error!(error = %err, storage_key = %key, "Failed to remove artifact during retract");
                }
            }
        }

        if !records.delete_by_id(id).await.map_err(store_error)? {
            return Err(PublishError::NotFound(format!("Record {}", id)));
        }

        tracing::info!(record_id = %id, "Record retracted");
        Ok(record)
    }

    /// Find the first record matching `filter` and open its artifact.
    pub async fn resolve<R: Submission>(
        &self,
        records: &dyn RecordStore<R>,
        filter: &Filter,
    ) -> Result<ResolvedArtifact<R>, PublishError> {
        let record = records
            .find_one(filter)
            .await
            .map_err(store_error)?
            .ok_or_else(|| PublishError::NotFound("File".to_string()))?;
        self.open_attachment(record).await
    }

    pub async fn resolve_by_id<R: Submission>(
        &self,
        records: &dyn RecordStore<R>,
        id: Uuid,
    ) -> Result<ResolvedArtifact<R>, PublishError> {
        let record = records
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| PublishError::NotFound(format!("Record {}", id)))?;
        self.open_attachment(record).await
    }

    async fn open_attachment<R: Submission>(
        &self,
        record: R,
    ) -> Result<ResolvedArtifact<R>, PublishError> {
        let attachment = record
            .attachment()
            .cloned()
            .ok_or_else(|| PublishError::NotFound("File".to_string()))?;

        let body = match self.storage.open(&attachment.storage.key).await {
            Ok(body) => body,
            Err(e) if e.is_not_found() => {
                tracing::error!(
                    record_id = %record.id(),
                    storage_key = %attachment.storage.key,
                    "Record references a missing artifact"
                );
                return Err(PublishError::ArtifactMissing(attachment.storage.key.clone()));
            }
            Err(e) => return Err(PublishError::StorageTransfer(e.to_string())),
        };

        Ok(ResolvedArtifact {
            record,
            attachment,
            body,
        })
    }
}
