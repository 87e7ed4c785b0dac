//! Placement Core Library
//!
//! Domain models, entity schemas, the moderation state machine, error types and
//! configuration shared by every placement portal crate.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod storage_types;

// Re-export commonly used types
pub use auth::AdminCredential;
pub use config::{is_scriptable_mime, Config, PortalConfig, UploadLimits};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    AlumniExperience, Attachment, Moderated, Moderation, ModerationStatus, Record, Resource,
    ResourceCategory, ShowcaseProject, StoredArtifact, Submission, Submitter, TransitionError,
};
pub use schema::{EntitySchema, FieldValue, FormFields, ValidatedFields, Violation, Violations};
pub use storage_types::StorageBackend;
