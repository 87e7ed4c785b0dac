//! Upload intake: size and type checks, then a staged copy on local disk.

use crate::error::IntakeError;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use placement_core::UploadLimits;
use placement_storage::StagedFile;
use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_EXTENSION_LENGTH: usize = 10;
const MAX_ORIGINAL_NAME_LENGTH: usize = 255;

/// A file part as it arrives from the client.
pub struct IncomingFile<S> {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: S,
}

impl<S> IncomingFile<S> {
    pub fn new(file_name: Option<String>, content_type: Option<String>, body: S) -> Self {
        Self {
            file_name,
            content_type,
            body,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadIntake {
    staging_dir: PathBuf,
}

impl UploadIntake {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Validate a file part and write it into the staging directory.
    ///
    /// Checks run in order: presence, size, MIME type. Nothing is written unless
    /// all of them pass.
    #[tracing::instrument(skip(self, part, limits), fields(max_size_bytes = limits.max_size_bytes))]
    pub async fn stage<S, E>(
        &self,
        part: Option<IncomingFile<S>>,
        limits: &UploadLimits,
    ) -> Result<StagedFile, IntakeError>
    where
        S: Stream<Item = Result<Bytes, E>> + Send,
        E: Display,
    {
        let part = part.ok_or(IntakeError::MissingFile)?;
        let original_name = display_name(part.file_name.as_deref());
        let mime_type = normalize_mime_type(
            part.content_type
                .as_deref()
                .unwrap_or("application/octet-stream"),
        );

        let data = read_limited(part.body, limits.max_size_bytes).await?;

        if !limits.allows(&mime_type) {
            tracing::info!(mime_type = %mime_type, "Rejected upload with disallowed type");
            return Err(IntakeError::UnsupportedType(mime_type));
        }

        let staging_dir = self.staging_dir.clone();
        let extension = sanitized_extension(&original_name);
        let size_bytes = data.len() as u64;

        let temp_path = tokio::task::spawn_blocking(move || write_staged(&staging_dir, &extension, &data))
            .await
            .map_err(|e| IntakeError::StagingIo(format!("Staging task failed: {}", e)))?
            .map_err(|e| IntakeError::StagingIo(e.to_string()))?;

        let stored_name = temp_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| IntakeError::StagingIo("Staged file has no name".to_string()))?;

        tracing::info!(
            stored_name = %stored_name,
            size_bytes = size_bytes,
            mime_type = %mime_type,
            "Upload staged"
        );

        Ok(StagedFile::new(
            original_name,
            stored_name,
            mime_type,
            size_bytes,
            temp_path,
        ))
    }
}

/// Buffer the body, stopping at the first byte past `max_size_bytes`.
async fn read_limited<S, E>(body: S, max_size_bytes: usize) -> Result<Vec<u8>, IntakeError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    futures::pin_mut!(body);
    let mut data = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| IntakeError::StagingIo(format!("Upload interrupted: {}", e)))?;
        if data.len() + chunk.len() > max_size_bytes {
            return Err(IntakeError::FileTooLarge {
                max_bytes: max_size_bytes,
            });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

/// Create `<unix-millis>-<random>.<ext>` exclusively in the staging directory.
/// A failed write removes the partial file.
fn write_staged(
    staging_dir: &Path,
    extension: &str,
    data: &[u8],
) -> std::io::Result<tempfile::TempPath> {
    std::fs::create_dir_all(staging_dir)?;

    let prefix = format!("{}-", chrono::Utc::now().timestamp_millis());
    let suffix = if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension)
    };

    let mut file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .rand_bytes(12)
        .tempfile_in(staging_dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;

    Ok(file.into_temp_path())
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
        .to_lowercase()
}

/// Extension of the client filename, restricted to lowercase ASCII alphanumerics.
pub fn sanitized_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            e.chars()
                .filter(char::is_ascii_alphanumeric)
                .take(MAX_EXTENSION_LENGTH)
                .collect::<String>()
                .to_lowercase()
        })
        .unwrap_or_default()
}

/// Client filename reduced to its last path segment, without control characters.
pub fn display_name(file_name: Option<&str>) -> String {
    let raw = file_name.unwrap_or_default();
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_ORIGINAL_NAME_LENGTH)
        .collect();

    if cleaned.trim().is_empty() || cleaned == "." || cleaned == ".." {
        "file".to_string()
    } else {
        cleaned
    }
}
