//! Accepted upload waiting in the staging directory.

use std::io;
use std::path::Path;
use tempfile::TempPath;

/// A file that passed intake checks and sits in the staging directory.
///
/// The handle owns the staging file. It is consumed either by [`StagedFile::discard`]
/// or by [`crate::ArtifactStore::store`]; dropping it unconsumed deletes the file,
/// so an abandoned request never leaves a temp file behind.
#[derive(Debug)]
pub struct StagedFile {
    original_name: String,
    stored_name: String,
    mime_type: String,
    size_bytes: u64,
    path: TempPath,
}

impl StagedFile {
    pub fn new(
        original_name: impl Into<String>,
        stored_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        path: TempPath,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            stored_name: stored_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            path,
        }
    }

    /// Client-supplied filename. Untrusted; only used for display and downloads.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staging file now and report the outcome.
    pub fn discard(self) -> io::Result<()> {
        self.path.close()
    }

    /// Hand the staging file to a backend, which becomes responsible for it.
    pub fn into_temp_path(self) -> TempPath {
        self.path
    }
}
