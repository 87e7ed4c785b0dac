use crate::keys::validate_key;
use crate::traits::{ArtifactStore, ByteStream, StorageError, StorageResult};
use crate::{StagedFile, StorageBackend, StoredArtifact};
use async_trait::async_trait;
use futures::StreamExt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::TempPath;
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for published files (e.g., "./uploads")
    /// * `base_url` - Base URL the files are served from (e.g., "http://localhost:4000/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let relative = Path::new(storage_key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(self.base_path.join(relative))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

/// Move `temp` to `dest` without replacing an existing file. Falls back to
/// copy-then-delete when a rename is impossible (e.g. across devices).
fn place_file(temp: TempPath, dest: &Path) -> StorageResult<()> {
    let err = match temp.persist_noclobber(dest) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    if err.error.kind() == io::ErrorKind::AlreadyExists {
        // err.path drops here and removes the staged copy
        return Err(StorageError::AlreadyExists(dest.display().to_string()));
    }

    let temp = err.path;
    let copied = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .and_then(|mut out| {
            let mut src = std::fs::File::open(&temp)?;
            io::copy(&mut src, &mut out)?;
            out.sync_all()
        });

    if let Err(e) = copied {
        if e.kind() == io::ErrorKind::AlreadyExists {
            return Err(StorageError::AlreadyExists(dest.display().to_string()));
        }
        let _ = std::fs::remove_file(dest);
        return Err(StorageError::UploadFailed(format!(
            "Failed to copy file to {}: {}",
            dest.display(),
            e
        )));
    }

    if let Err(e) = temp.close() {
        tracing::warn!(
            error = %e,
            dest = %dest.display(),
            "Failed to remove staged file after copy"
        );
    }
    Ok(())
}

#[async_trait]
impl ArtifactStore for LocalStorage {
    async fn store(&self, staged: StagedFile, key: &str) -> StorageResult<StoredArtifact> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();
        let size = staged.size_bytes();
        let temp = staged.into_temp_path();
        let dest = path.clone();

        tokio::task::spawn_blocking(move || place_file(temp, &dest))
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Move task failed: {}", e)))??;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store successful"
        );

        Ok(StoredArtifact {
            key: key.to_string(),
            location: self.generate_url(key),
            backend: StorageBackend::Local,
        })
    }

    async fn remove(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn open(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let key = storage_key.to_string();
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream download error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
