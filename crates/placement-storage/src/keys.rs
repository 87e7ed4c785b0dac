//! Shared key construction for storage backends.

use crate::{StorageError, StorageResult};

/// Build the storage key `{folder}/{stored_name}`.
///
/// `stored_name` is server-generated, but it is still checked so a bad value can
/// never address anything outside its folder.
pub fn artifact_key(folder: &str, stored_name: &str) -> StorageResult<String> {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        return Err(StorageError::InvalidKey("Storage folder is empty".to_string()));
    }
    if stored_name.is_empty()
        || stored_name.contains('/')
        || stored_name.contains('\\')
        || stored_name.starts_with('.')
    {
        return Err(StorageError::InvalidKey(format!(
            "Stored name '{}' is not a plain filename",
            stored_name
        )));
    }
    let key = format!("{}/{}", folder, stored_name);
    validate_key(&key)?;
    Ok(key)
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\0') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
