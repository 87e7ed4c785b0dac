//! Admin moderation of submitted records.

use crate::error::PublishError;
use chrono::Utc;
use placement_core::{Moderated, ModerationStatus};
use placement_db::{RecordStore, StoreError};
use uuid::Uuid;

/// Move a record to `target`. Repeating the current state changes nothing and
/// skips the write. Artifacts are never touched.
#[tracing::instrument(skip(records), fields(collection = R::COLLECTION))]
pub async fn moderate<R: Moderated>(
    records: &dyn RecordStore<R>,
    id: Uuid,
    target: ModerationStatus,
    actor: &str,
) -> Result<R, PublishError> {
    let mut record = records
        .find_by_id(id)
        .await
        .map_err(|e| PublishError::Persistence(e.to_string()))?
        .ok_or_else(|| PublishError::NotFound(format!("Record {}", id)))?;

    let changed = record
        .moderation_mut()
        .transition(target, actor, Utc::now())?;

    if changed {
        records.update_by_id(&record).await.map_err(|e| match e {
            StoreError::NotFound(id) => PublishError::NotFound(format!("Record {}", id)),
            other => PublishError::Persistence(other.to_string()),
        })?;
        tracing::info!(record_id = %id, status = %target, actor = actor, "Moderation status changed");
    }

    Ok(record)
}
