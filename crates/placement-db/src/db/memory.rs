use super::store::{Filter, RecordStore, SortKey, StoreError, StoreResult};
use async_trait::async_trait;
use placement_core::Record;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Document {
    id: Uuid,
    storage_key: Option<String>,
    body: Value,
}

/// Process-local record store with the same contract as the Postgres one,
/// including storage-key uniqueness. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<&'static str, Vec<Document>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn decode<R: Record>(body: &Value) -> StoreResult<R> {
    Ok(serde_json::from_value(body.clone())?)
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryDocumentStore {
    async fn insert(&self, record: &R) -> StoreResult<()> {
        let body = serde_json::to_value(record)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(R::COLLECTION).or_default();

        if docs.iter().any(|d| d.id == record.id()) {
            return Err(StoreError::Duplicate(format!("id {}", record.id())));
        }
        if let Some(key) = record.storage_key() {
            if docs.iter().any(|d| d.storage_key.as_deref() == Some(key)) {
                return Err(StoreError::Duplicate(format!("storage key {}", key)));
            }
        }

        docs.push(Document {
            id: record.id(),
            storage_key: record.storage_key().map(str::to_string),
            body,
        });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<R>> {
        let collections = self.collections.read().await;
        collections
            .get(R::COLLECTION)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .map(|d| decode(&d.body))
            .transpose()
    }

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<R>> {
        let collections = self.collections.read().await;
        collections
            .get(R::COLLECTION)
            .and_then(|docs| docs.iter().rev().find(|d| filter.matches(&d.body)))
            .map(|d| decode(&d.body))
            .transpose()
    }

    async fn find_many(&self, filter: &Filter, sort: &[SortKey]) -> StoreResult<Vec<R>> {
        let mut matched: Vec<Value> = {
            let collections = self.collections.read().await;
            collections
                .get(R::COLLECTION)
                .map(|docs| {
                    // newest insert first, matching the Postgres tiebreak
                    docs.iter()
                        .rev()
                        .filter(|d| filter.matches(&d.body))
                        .map(|d| d.body.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        matched.sort_by(|a, b| {
            sort.iter()
                .map(|key| key.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        matched.iter().map(decode).collect()
    }

    async fn update_by_id(&self, record: &R) -> StoreResult<()> {
        let body = serde_json::to_value(record)?;
        let mut collections = self.collections.write().await;
        let doc = collections
            .get_mut(R::COLLECTION)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == record.id()))
            .ok_or(StoreError::NotFound(record.id()))?;

        doc.storage_key = record.storage_key().map(str::to_string);
        doc.body = body;
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(R::COLLECTION) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use placement_core::models::{Moderation, ModerationStatus};
    use placement_core::AlumniExperience;

    fn experience(name: &str) -> AlumniExperience {
        AlumniExperience {
            id: Uuid::new_v4(),
            alumni_name: name.to_string(),
            alumni_email: None,
            batch: 2020,
            company: "Acme".to_string(),
            role: "SDE".to_string(),
            experience: "Three rounds.".to_string(),
            moderation: Moderation::pending(Utc::now()),
        }
    }

    #[tokio::test]
    async fn insert_find_update_delete() {
        let store = MemoryDocumentStore::new();
        let mut exp = experience("Asha");

        store.insert(&exp).await.unwrap();
        let found: Option<AlumniExperience> = store.find_by_id(exp.id).await.unwrap();
        assert_eq!(found.as_ref(), Some(&exp));

        exp.company = "Globex".to_string();
        store.update_by_id(&exp).await.unwrap();
        let found: AlumniExperience = store.find_by_id(exp.id).await.unwrap().unwrap();
        assert_eq!(found.company, "Globex");

        assert!(RecordStore::<AlumniExperience>::delete_by_id(&store, exp.id)
            .await
            .unwrap());
        assert!(!RecordStore::<AlumniExperience>::delete_by_id(&store, exp.id)
            .await
            .unwrap());
        assert!(matches!(
            store.update_by_id(&exp).await,
            Err(StoreError::NotFound(id)) if id == exp.id
        ));
    }

    #[tokio::test]
    async fn find_many_filters_and_sorts() {
        let store = MemoryDocumentStore::new();
        let t0 = Utc::now();

        let mut early = experience("Early");
        early.moderation.transition(ModerationStatus::Approved, "Admin", t0).unwrap();
        let mut late = experience("Late");
        late.moderation
            .transition(ModerationStatus::Approved, "Admin", t0 + Duration::hours(1))
            .unwrap();
        let pending = experience("Pending");

        for e in [&early, &late, &pending] {
            store.insert(e).await.unwrap();
        }

        let approved: Vec<AlumniExperience> = store
            .find_many(
                &Filter::all().eq("status", "Approved"),
                &[SortKey::newest_first("approvedAt")],
            )
            .await
            .unwrap();
        let names: Vec<_> = approved.iter().map(|e| e.alumni_name.as_str()).collect();
        assert_eq!(names, vec!["Late", "Early"]);

        let one: Option<AlumniExperience> = store
            .find_one(&Filter::all().eq("alumniName", "Pending"))
            .await
            .unwrap();
        assert_eq!(one.map(|e| e.id), Some(pending.id));
        assert_eq!(store.count(AlumniExperience::COLLECTION).await, 3);
    }
}
