//! Storage setup: permanent artifact storage and the local staging directory.

use anyhow::{Context, Result};
use placement_core::Config;
use placement_services::{create_storage, ArtifactStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ArtifactStore>> {
    tokio::fs::create_dir_all(config.staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create staging directory {}",
                config.staging_dir().display()
            )
        })?;

    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize artifact storage")?;
    tracing::info!(
        backend = ?storage.backend_type(),
        staging_dir = %config.staging_dir().display(),
        "Storage initialized successfully"
    );

    Ok(storage)
}
