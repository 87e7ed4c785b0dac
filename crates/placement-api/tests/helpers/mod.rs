//! Test helpers: build AppState and router for integration tests.
//!
//! Records live in the in-memory document store and artifacts in a temp
//! directory, so no database or Docker is needed.
//! Run from workspace root: `cargo test -p placement-api --test api_test`.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use placement_api::constants;
use placement_api::setup::{database, routes, services};
use placement_api::state::AppState;
use placement_core::{Config, PortalConfig, StorageBackend, UploadLimits};
use placement_db::MemoryDocumentStore;
use placement_services::LocalStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const MB: usize = 1024 * 1024;

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, shared record store and owned temp directories.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub records: MemoryDocumentStore,
    pub storage_root: PathBuf,
    pub staging_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn staged_files(&self) -> usize {
        count_files(&self.staging_dir)
    }

    pub fn stored_files(&self, folder: &str) -> usize {
        count_files(&self.storage_root.join(folder))
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

fn test_config(temp_dir: &Path) -> Config {
    Config(Box::new(PortalConfig {
        server_port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        environment: "test".to_string(),
        http_concurrency_limit: 64,
        database_url: "memory:".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some(temp_dir.join("storage").display().to_string()),
        local_storage_base_url: Some("http://localhost:4000/uploads".to_string()),
        resource_folder: "resources".to_string(),
        project_folder: "projects".to_string(),
        staging_dir: temp_dir.join("staging"),
        resource_limits: UploadLimits::new(10 * MB, &["image/", "application/pdf"]),
        project_image_limits: UploadLimits::new(5 * MB, &["image/"]),
        transfer_timeout_secs: 30,
        persist_timeout_secs: 5,
        admin_password: ADMIN_PASSWORD.to_string(),
        admin_actor: "Admin".to_string(),
        admin_email: None,
        email_notifications_enabled: false,
        smtp_host: None,
        smtp_port: None,
        smtp_user: None,
        smtp_password: None,
        smtp_from: None,
        smtp_tls: true,
        notification_queue_capacity: 16,
        notification_max_attempts: 1,
        notification_retry_base_ms: 10,
    }))
}

/// Setup test app with an in-memory record store and local storage.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let storage_root = temp_dir.path().join("storage");
    let staging_dir = config.staging_dir().to_path_buf();
    std::fs::create_dir_all(&staging_dir).expect("Failed to create staging dir");

    let storage = LocalStorage::new(
        storage_root.clone(),
        "http://localhost:4000/uploads".to_string(),
    )
    .await
    .expect("Failed to create local storage");

    let records = MemoryDocumentStore::new();
    let state = services::initialize_services(
        &config,
        database::memory_state(records.clone()),
        Arc::new(storage),
    )
    .expect("Failed to initialize services");

    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        records,
        storage_root,
        staging_dir,
        _temp_dir: temp_dir,
    }
}

pub fn admin_bearer() -> String {
    format!("Bearer {}", ADMIN_PASSWORD)
}

/// JPEG magic followed by filler up to `size` bytes.
pub fn jpeg_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0x5Au8; size];
    data[..4].copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    data
}

pub fn file_part(name: &str, mime_type: &str, data: Vec<u8>) -> Part {
    Part::bytes(bytes::Bytes::from(data))
        .file_name(name.to_string())
        .mime_type(mime_type.to_string())
}

pub fn project_form(github_link: &str, image: Part) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "Drive Matcher")
        .add_text("shortDescription", "Matches students to drives by eligibility")
        .add_text("technologies", "Rust, axum, Postgres")
        .add_text("githubLink", github_link)
        .add_text("submittedByName", "Meera Iyer")
        .add_text("submittedByEmail", "meera@college.edu")
        .add_part("image", image)
}

pub fn resource_form(file: Part) -> MultipartForm {
    MultipartForm::new()
        .add_text("category", "Guidelines")
        .add_text("description", "Placement season rules")
        .add_part("file", file)
}
