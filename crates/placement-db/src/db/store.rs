use async_trait::async_trait;
use chrono::{DateTime, Utc};
use placement_core::{AppError, Record};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Record {} not found", id)),
            other => AppError::Database(other.to_string()),
        }
    }
}

/// Top-level field equality filter over a record's JSON body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Matches every record in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, body: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| body.get(field) == Some(expected))
    }

    /// Containment document for a JSONB `@>` query.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Order by a timestamp field. Records lacking the field sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub descending: bool,
}

impl SortKey {
    pub fn newest_first(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    pub fn oldest_first(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    fn timestamp(&self, body: &Value) -> Option<DateTime<Utc>> {
        body.get(self.field)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    /// In-process equivalent of `ORDER BY ... NULLS LAST`.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match (self.timestamp(a), self.timestamp(b)) {
            (Some(x), Some(y)) if self.descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Durable metadata store for one record type.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the record's storage key is taken.
    async fn insert(&self, record: &R) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<R>>;

    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<R>>;

    async fn find_many(&self, filter: &Filter, sort: &[SortKey]) -> StoreResult<Vec<R>>;

    /// Replace a stored record. `StoreError::NotFound` if it no longer exists.
    async fn update_by_id(&self, record: &R) -> StoreResult<()>;

    /// Returns whether a record was deleted.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;
}
