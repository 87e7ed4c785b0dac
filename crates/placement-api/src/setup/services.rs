//! Service wiring: intake, notification outbox, orchestrator and admin
//! credential assembled into `AppState`.

use crate::state::{AppState, AuthState, DbState, UploadState};
use anyhow::Result;
use placement_core::{AdminCredential, Config};
use placement_services::{
    ArtifactStore, LogNotifier, NotificationOutbox, NotificationOutboxConfig, Notifier,
    PublishOrchestrator, PublishSettings, SmtpNotifier, UploadIntake,
};
use std::sync::Arc;

/// Must run inside the tokio runtime: starts the notification worker.
pub fn initialize_services(
    config: &Config,
    db: DbState,
    storage: Arc<dyn ArtifactStore>,
) -> Result<Arc<AppState>> {
    let notifier: Arc<dyn Notifier> = match SmtpNotifier::from_config(config) {
        Some(smtp) => Arc::new(smtp),
        None => {
            tracing::info!("SMTP not configured; submission notifications go to the log");
            Arc::new(LogNotifier)
        }
    };
    let outbox =
        NotificationOutbox::start(notifier, NotificationOutboxConfig::from_config(config));

    let orchestrator = PublishOrchestrator::new(storage, PublishSettings::from_config(config))
        .with_notifications(outbox.clone());

    let uploads = UploadState {
        intake: UploadIntake::new(config.staging_dir()),
        orchestrator,
        resource_limits: config.resource_limits().clone(),
        project_image_limits: config.project_image_limits().clone(),
        outbox: Some(outbox),
    };

    let auth = AuthState {
        credential: AdminCredential::new(config.admin_password())
            .with_actor(config.admin_actor()),
    };

    tracing::info!(
        resource_max_bytes = uploads.resource_limits.max_size_bytes,
        project_image_max_bytes = uploads.project_image_limits.max_size_bytes,
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        db,
        uploads,
        auth,
        config: config.clone(),
        is_production: config.is_production(),
    }))
}
