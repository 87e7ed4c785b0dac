//! Domain models
//!
//! Records persisted by the portal and the traits that let storage and the
//! publish pipeline handle them generically.

pub mod alumni;
pub mod artifact;
pub mod moderation;
pub mod project;
pub mod resource;

pub use alumni::AlumniExperience;
pub use artifact::{Attachment, StoredArtifact};
pub use moderation::{Moderation, ModerationStatus, TransitionError};
pub use project::{ShowcaseProject, Submitter};
pub use resource::{Resource, ResourceCategory};

use crate::schema::{EntitySchema, ValidatedFields, Violations};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A document persisted in a named collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    /// Permanent-storage key owned by this record; unique across records.
    fn storage_key(&self) -> Option<&str> {
        None
    }
}

/// A record created from validated form metadata, optionally with a stored file.
pub trait Submission: Record {
    const SCHEMA: EntitySchema;

    fn assemble(
        fields: &ValidatedFields,
        attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Result<Self, Violations>;

    fn attachment(&self) -> Option<&Attachment>;
}

/// A record that moves through the moderation workflow.
pub trait Moderated: Record {
    fn moderation(&self) -> &Moderation;

    fn moderation_mut(&mut self) -> &mut Moderation;
}
