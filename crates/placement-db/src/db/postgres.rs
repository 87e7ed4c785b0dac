use super::store::{Filter, RecordStore, SortKey, StoreError, StoreResult};
use async_trait::async_trait;
use placement_core::Record;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Records stored as JSONB rows of the `documents` table, one collection per type.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.message().to_string())
        }
        e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

fn order_clause(sort: &[SortKey]) -> String {
    let mut parts: Vec<String> = sort
        .iter()
        .filter(|key| key.field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
        .map(|key| {
            format!(
                "(body->>'{}')::timestamptz {} NULLS LAST",
                key.field,
                if key.descending { "DESC" } else { "ASC" }
            )
        })
        .collect();
    parts.push("created_at DESC".to_string());
    parts.join(", ")
}

fn decode<R: Record>(body: Value) -> StoreResult<R> {
    Ok(serde_json::from_value(body)?)
}

#[async_trait]
impl<R: Record> RecordStore<R> for PgDocumentStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "documents", db.collection = R::COLLECTION, db.operation = "insert", db.record_id = %record.id()))]
    async fn insert(&self, record: &R) -> StoreResult<()> {
        let body = serde_json::to_value(record)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, storage_key, body)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id())
        .bind(R::COLLECTION)
        .bind(record.storage_key())
        .bind(Json(body))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.collection = R::COLLECTION, db.operation = "select", db.record_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<R>> {
        let body = sqlx::query_scalar::<Postgres, Json<Value>>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(R::COLLECTION)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        body.map(|Json(b)| decode(b)).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.collection = R::COLLECTION, db.operation = "select"))]
    async fn find_one(&self, filter: &Filter) -> StoreResult<Option<R>> {
        let body = sqlx::query_scalar::<Postgres, Json<Value>>(
            r#"
            SELECT body FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(R::COLLECTION)
        .bind(Json(filter.to_json()))
        .fetch_optional(&self.pool)
        .await?;

        body.map(|Json(b)| decode(b)).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.collection = R::COLLECTION, db.operation = "select"))]
    async fn find_many(&self, filter: &Filter, sort: &[SortKey]) -> StoreResult<Vec<R>> {
        let query = format!(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 ORDER BY {}",
            order_clause(sort)
        );

        let rows = sqlx::query_scalar::<Postgres, Json<Value>>(&query)
            .bind(R::COLLECTION)
            .bind(Json(filter.to_json()))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|Json(b)| decode(b)).collect()
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "documents", db.collection = R::COLLECTION, db.operation = "update", db.record_id = %record.id()))]
    async fn update_by_id(&self, record: &R) -> StoreResult<()> {
        let body = serde_json::to_value(record)?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = $3, storage_key = $4, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(R::COLLECTION)
        .bind(record.id())
        .bind(Json(body))
        .bind(record.storage_key())
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(record.id()));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "documents", db.collection = R::COLLECTION, db.operation = "delete", db.record_id = %id))]
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(R::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
