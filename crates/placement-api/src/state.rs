//! Application state and sub-state extractors.
//!
//! AppState is split into sub-states so handlers and middleware can extract only
//! what they need via Axum's `FromRef`.

use placement_core::{
    AdminCredential, AlumniExperience, Config, Resource, ShowcaseProject, UploadLimits,
};
use placement_db::RecordStore;
use placement_services::{ArtifactStore, NotificationOutbox, PublishOrchestrator, UploadIntake};
use sqlx::PgPool;
use std::sync::Arc;

// ----- Sub-state types -----

/// Record stores per collection, plus the pool when backed by Postgres.
#[derive(Clone)]
pub struct DbState {
    pub pool: Option<PgPool>,
    pub resources: Arc<dyn RecordStore<Resource>>,
    pub projects: Arc<dyn RecordStore<ShowcaseProject>>,
    pub alumni: Arc<dyn RecordStore<AlumniExperience>>,
}

/// Upload intake, the publish orchestrator and per-entity upload limits.
#[derive(Clone)]
pub struct UploadState {
    pub intake: UploadIntake,
    pub orchestrator: PublishOrchestrator,
    pub resource_limits: UploadLimits,
    pub project_image_limits: UploadLimits,
    pub outbox: Option<NotificationOutbox>,
}

impl UploadState {
    pub fn storage(&self) -> &Arc<dyn ArtifactStore> {
        self.orchestrator.storage()
    }

    /// Stop background notification delivery.
    pub async fn shutdown(&self) {
        if let Some(outbox) = &self.outbox {
            outbox.shutdown().await;
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub credential: AdminCredential,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub uploads: UploadState,
    pub auth: AuthState,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for UploadState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.uploads.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for AuthState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.auth.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
