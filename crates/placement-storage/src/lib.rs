//! Placement Storage Library
//!
//! Permanent storage for published artifacts, plus the `StagedFile` handle that
//! carries an accepted upload from intake to publish.
//!
//! # Storage key format
//!
//! Keys are `{folder}/{stored_name}`, where the folder is configured per entity
//! (`resources`, `projects`). Keys must not contain `..` or a leading `/`. Key
//! construction lives in the `keys` module so all backends agree.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod staged;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::artifact_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use placement_core::{StorageBackend, StoredArtifact};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use staged::StagedFile;
pub use traits::{ArtifactStore, ByteStream, StorageError, StorageResult};
