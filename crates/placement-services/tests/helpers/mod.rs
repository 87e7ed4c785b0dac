//! Test helpers: a publish pipeline over local storage and the in-memory record
//! store, rooted in a temporary directory.
//!
//! Run from workspace root: `cargo test -p placement-services --test publish_test`.

pub mod failing;

use bytes::Bytes;
use failing::{FailingArtifactStore, TransferFault};
use futures::stream;
use placement_core::{FormFields, UploadLimits};
use placement_db::MemoryDocumentStore;
use placement_services::{
    ArtifactStore, IncomingFile, LocalStorage, PublishOrchestrator, PublishSettings, StagedFile,
    UploadIntake,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const MB: usize = 1024 * 1024;

pub type Body = stream::Iter<std::vec::IntoIter<Result<Bytes, io::Error>>>;

/// Pipeline under test plus the directories it writes to.
pub struct TestPipeline {
    pub intake: UploadIntake,
    pub orchestrator: PublishOrchestrator,
    pub records: MemoryDocumentStore,
    pub _temp_dir: TempDir,
    storage_root: PathBuf,
}

impl TestPipeline {
    pub async fn new() -> Self {
        Self::with_settings(PublishSettings::default()).await
    }

    pub async fn with_settings(settings: PublishSettings) -> Self {
        Self::build(settings, |local| Arc::new(local) as Arc<dyn ArtifactStore>).await
    }

    /// Pipeline whose storage fails transfers as `fault` describes.
    pub async fn with_transfer_fault(
        fault: TransferFault,
        settings: PublishSettings,
    ) -> (Self, Arc<FailingArtifactStore>) {
        let mut failing = None;
        let pipeline = Self::build(settings, |local| {
            let store = Arc::new(FailingArtifactStore::new(local, fault));
            failing = Some(Arc::clone(&store));
            store as Arc<dyn ArtifactStore>
        })
        .await;
        (pipeline, failing.expect("storage wrapper was built"))
    }

    async fn build(
        settings: PublishSettings,
        wrap: impl FnOnce(LocalStorage) -> Arc<dyn ArtifactStore>,
    ) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage_root = temp_dir.path().join("uploads");
        let storage = LocalStorage::new(
            storage_root.clone(),
            "http://localhost:4000/uploads".to_string(),
        )
        .await
        .expect("Failed to create local storage");

        Self {
            intake: UploadIntake::new(temp_dir.path().join("staging")),
            orchestrator: PublishOrchestrator::new(wrap(storage), settings),
            records: MemoryDocumentStore::new(),
            storage_root,
            _temp_dir: temp_dir,
        }
    }

    pub fn staging_dir(&self) -> &Path {
        self.intake.staging_dir()
    }

    /// Number of files currently waiting in staging.
    pub fn staged_files(&self) -> usize {
        count_files(self.staging_dir())
    }

    /// Number of files in a permanent-storage folder.
    pub fn stored_files(&self, folder: &str) -> usize {
        count_files(&self.storage_root.join(folder))
    }

    pub fn artifact_path(&self, key: &str) -> PathBuf {
        self.storage_root.join(key)
    }

    pub async fn stage(&self, part: IncomingFile<Body>, limits: &UploadLimits) -> StagedFile {
        self.intake
            .stage(Some(part), limits)
            .await
            .expect("Failed to stage file")
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Split `data` into 64 KiB chunks, the way a multipart body arrives.
pub fn body(data: Vec<u8>) -> Body {
    let chunks: Vec<Result<Bytes, io::Error>> = data
        .chunks(64 * 1024)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    stream::iter(chunks)
}

/// JPEG magic followed by filler up to `size` bytes.
pub fn jpeg_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0x5Au8; size];
    data[..4].copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    data
}

pub fn jpeg(name: &str, size: usize) -> IncomingFile<Body> {
    IncomingFile::new(
        Some(name.to_string()),
        Some("image/jpeg".to_string()),
        body(jpeg_bytes(size)),
    )
}

pub fn pdf(name: &str, contents: &[u8]) -> IncomingFile<Body> {
    IncomingFile::new(
        Some(name.to_string()),
        Some("application/pdf".to_string()),
        body(contents.to_vec()),
    )
}

pub fn image_limits() -> UploadLimits {
    UploadLimits::new(5 * MB, &["image/"])
}

pub fn resource_limits() -> UploadLimits {
    UploadLimits::new(10 * MB, &["image/", "application/pdf"])
}

pub fn project_fields(title: &str) -> FormFields {
    FormFields::new()
        .with("title", title)
        .with("shortDescription", "Matches students to drives by eligibility")
        .with("technologies", "Rust, axum, Postgres")
        .with("githubLink", "https://github.com/tpo-cell/drive-matcher")
        .with("submittedByName", "Meera Iyer")
        .with("submittedByEmail", "meera@college.edu")
}

pub fn resource_fields() -> FormFields {
    FormFields::new()
        .with("category", "Guidelines")
        .with("description", "Placement season rules")
}

pub fn alumni_fields() -> FormFields {
    FormFields::new()
        .with("alumniName", "Karan Shah")
        .with("batch", "2021")
        .with("company", "Acme Analytics")
        .with("role", "Data Engineer")
        .with("experience", "Three rounds: aptitude, SQL, and a system design chat.")
}

/// Publish settings with short deadlines for timeout tests.
pub fn fast_settings(persist_timeout: Duration) -> PublishSettings {
    PublishSettings {
        persist_timeout,
        ..PublishSettings::default()
    }
}

pub fn fast_transfer_settings(transfer_timeout: Duration) -> PublishSettings {
    PublishSettings {
        transfer_timeout,
        ..PublishSettings::default()
    }
}
