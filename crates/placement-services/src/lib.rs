//! Placement Services Layer
//!
//! Upload intake, the publish orchestrator, moderation and admin notifications.
//! Business logic and coordination live here; HTTP handling stays in
//! placement-api.

pub mod error;
pub mod intake;
pub mod moderation;
pub mod notify;
pub mod orchestrator;

pub use error::{IntakeError, PublishError};
pub use intake::{IncomingFile, UploadIntake};
pub use moderation::moderate;
pub use notify::{
    LogNotifier, Notification, NotificationOutbox, NotificationOutboxConfig, Notifier, Notify,
    SmtpNotifier,
};
pub use orchestrator::{PublishOrchestrator, PublishSettings, ResolvedArtifact, StorageFolders};
pub use placement_storage::{
    create_storage, ArtifactStore, ByteStream, StagedFile, StorageBackend, StorageError, StorageResult,
};
#[cfg(feature = "storage-local")]
pub use placement_storage::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use placement_storage::S3Storage;
