//! Record store setup: Postgres with migrations, or the in-process store for
//! `DATABASE_URL=memory:`.

use crate::state::DbState;
use anyhow::{Context, Result};
use placement_core::Config;
use placement_db::{MemoryDocumentStore, PgDocumentStore};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub async fn setup_database(config: &Config) -> Result<DbState> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory record store; records are lost on restart");
        return Ok(memory_state(MemoryDocumentStore::new()));
    }

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let store = PgDocumentStore::new(pool.clone());
    Ok(DbState {
        pool: Some(pool),
        resources: Arc::new(store.clone()),
        projects: Arc::new(store.clone()),
        alumni: Arc::new(store),
    })
}

/// Record stores sharing one in-process document store.
pub fn memory_state(store: MemoryDocumentStore) -> DbState {
    DbState {
        pool: None,
        resources: Arc::new(store.clone()),
        projects: Arc::new(store.clone()),
        alumni: Arc::new(store),
    }
}
