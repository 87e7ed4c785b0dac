use crate::storage_types::StorageBackend;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Locator of a file in permanent storage. Written once at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredArtifact {
    /// `<folder>/<storedName>`
    pub key: String,
    /// Public URL or path of the stored object
    pub location: String,
    pub backend: StorageBackend,
}

/// A published file as referenced from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub original_name: String,
    pub stored_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub storage: StoredArtifact,
}
