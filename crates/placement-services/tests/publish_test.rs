mod helpers;

use async_trait::async_trait;
use futures::future::join_all;
use futures::TryStreamExt;
use helpers::failing::{FailingRecordStore, InsertFault, TransferFault};
use helpers::*;
use placement_core::{
    AlumniExperience, FormFields, ModerationStatus, Resource, ShowcaseProject,
};
use placement_db::{Filter, RecordStore};
use placement_services::{
    moderate, IntakeError, Notification, NotificationOutbox, NotificationOutboxConfig, Notifier,
    PublishError, PublishSettings,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::test]
async fn test_project_image_within_limit_is_published() {
    let pipeline = TestPipeline::new().await;

    let staged = pipeline.stage(jpeg("demo.jpg", 3 * MB), &image_limits()).await;
    assert_eq!(staged.size_bytes(), (3 * MB) as u64);
    assert!(staged.mime_type().starts_with("image/"));

    let project = pipeline
        .orchestrator
        .publish::<ShowcaseProject>(
            &pipeline.records,
            staged,
            &project_fields("Drive Matcher"),
        )
        .await
        .expect("publish should succeed");

    assert_eq!(project.moderation.status, ModerationStatus::Pending);
    assert!(project.moderation.approved_at.is_none());
    assert_eq!(project.technologies, vec!["Rust", "axum", "Postgres"]);
    assert!(project.image.storage.key.starts_with("projects/"));
    assert_eq!(project.image.original_name, "demo.jpg");
    assert!(pipeline.artifact_path(&project.image.storage.key).exists());

    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.records.count("projects").await, 1);
}

#[tokio::test]
async fn test_oversized_image_is_rejected_before_staging() {
    let pipeline = TestPipeline::new().await;

    let result = pipeline
        .intake
        .stage(Some(jpeg("huge.jpg", 6 * MB)), &image_limits())
        .await;

    assert!(matches!(
        result,
        Err(IntakeError::FileTooLarge { max_bytes }) if max_bytes == 5 * MB
    ));
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.stored_files("projects"), 0);
}

#[tokio::test]
async fn test_wrong_type_is_rejected_for_project_images() {
    let pipeline = TestPipeline::new().await;

    let result = pipeline
        .intake
        .stage(Some(pdf("deck.pdf", b"%PDF-1.7")), &image_limits())
        .await;

    assert!(matches!(result, Err(IntakeError::UnsupportedType(m)) if m == "application/pdf"));
    assert_eq!(pipeline.staged_files(), 0);
}

#[tokio::test]
async fn test_invalid_metadata_discards_staged_file() {
    let pipeline = TestPipeline::new().await;
    let staged = pipeline.stage(jpeg("demo.jpg", 1024), &image_limits()).await;
    assert_eq!(pipeline.staged_files(), 1);

    let fields = project_fields("Drive Matcher").with("githubLink", "not-a-url");
    let result = pipeline
        .orchestrator
        .publish::<ShowcaseProject>(&pipeline.records, staged, &fields)
        .await;

    match result {
        Err(PublishError::Validation(violations)) => {
            assert_eq!(violations.fields(), vec!["githubLink"]);
        }
        other => panic!("expected validation error, got {:?}", other.map(|p| p.id)),
    }
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.stored_files("projects"), 0);
    assert_eq!(pipeline.records.count("projects").await, 0);
}

#[tokio::test]
async fn test_persistence_failure_removes_artifact() {
    let pipeline = TestPipeline::new().await;
    let records = FailingRecordStore::new(InsertFault::Unavailable);
    let staged = pipeline.stage(jpeg("demo.jpg", 2048), &image_limits()).await;

    let result = pipeline
        .orchestrator
        .publish::<ShowcaseProject>(&records, staged, &project_fields("Drive Matcher"))
        .await;

    assert!(matches!(result, Err(PublishError::Persistence(_))));
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.stored_files("projects"), 0);
    assert_eq!(records.inner.count("projects").await, 0);
}

#[tokio::test]
async fn test_persist_timeout_leaves_no_record_or_artifact() {
    let pipeline = TestPipeline::with_settings(fast_settings(Duration::from_millis(50))).await;
    let records = FailingRecordStore::new(InsertFault::Stall(Duration::from_millis(500)));
    let staged = pipeline.stage(pdf("rules.pdf", b"%PDF-1.4 rules"), &resource_limits()).await;

    let result = pipeline
        .orchestrator
        .publish::<Resource>(&records, staged, &resource_fields())
        .await;

    assert!(matches!(result, Err(PublishError::Persistence(_))));
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.stored_files("resources"), 0);

    // a stalled insert must not land after the caller was told it failed
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(records.inner.count("resources").await, 0);
}

#[tokio::test]
async fn test_project_without_submitter_email_is_rejected() {
    let pipeline = TestPipeline::new().await;
    let staged = pipeline.stage(jpeg("demo.jpg", 1024), &image_limits()).await;

    let fields = FormFields::new()
        .with("title", "Drive Matcher")
        .with("shortDescription", "Matches students to drives by eligibility")
        .with("technologies", "Rust")
        .with("githubLink", "https://github.com/tpo-cell/drive-matcher")
        .with("submittedByName", "Meera Iyer");
    let result = pipeline
        .orchestrator
        .publish::<ShowcaseProject>(&pipeline.records, staged, &fields)
        .await;

    match result {
        Err(PublishError::Validation(violations)) => {
            assert_eq!(violations.fields(), vec!["submittedByEmail"]);
        }
        other => panic!("expected validation error, got {:?}", other.map(|p| p.id)),
    }
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.stored_files("projects"), 0);
    assert_eq!(pipeline.records.count("projects").await, 0);
}

#[tokio::test]
async fn test_failed_transfer_removes_partial_artifact() {
    let (pipeline, storage) =
        TestPipeline::with_transfer_fault(TransferFault::Partial, PublishSettings::default())
            .await;
    let staged = pipeline.stage(jpeg("demo.jpg", 4096), &image_limits()).await;
    let key = format!("projects/{}", staged.stored_name());

    let result = pipeline
        .orchestrator
        .publish::<ShowcaseProject>(&pipeline.records, staged, &project_fields("Drive Matcher"))
        .await;

    assert!(matches!(result, Err(PublishError::StorageTransfer(_))));
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.stored_files("projects"), 0);
    assert_eq!(pipeline.records.count("projects").await, 0);
    assert_eq!(storage.removed_keys(), vec![key]);
}

#[tokio::test]
async fn test_transfer_timeout_cleans_up_once_the_move_settles() {
    let (pipeline, storage) = TestPipeline::with_transfer_fault(
        TransferFault::Stall(Duration::from_millis(300)),
        fast_transfer_settings(Duration::from_millis(50)),
    )
    .await;
    let staged = pipeline.stage(pdf("rules.pdf", b"%PDF-1.4 rules"), &resource_limits()).await;
    let key = format!("resources/{}", staged.stored_name());

    let result = pipeline
        .orchestrator
        .publish::<Resource>(&pipeline.records, staged, &resource_fields())
        .await;

    assert!(matches!(result, Err(PublishError::StorageTransfer(_))));
    assert_eq!(pipeline.records.count("resources").await, 0);
    // nothing may be removed while the transfer is still running
    assert!(storage.removed_keys().is_empty());

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(storage.removed_keys(), vec![key]);
    assert_eq!(pipeline.stored_files("resources"), 0);
    assert_eq!(pipeline.staged_files(), 0);
}

#[tokio::test]
async fn test_concurrent_publishes_get_unique_keys() {
    let pipeline = TestPipeline::new().await;
    let limits = resource_limits();

    let publishes = (0..8).map(|i| {
        let pipeline = &pipeline;
        let limits = &limits;
        async move {
            let staged = pipeline.stage(pdf("same-name.pdf", b"%PDF-1.4"), limits).await;
            let fields = resource_fields().with("description", format!("copy {}", i));
            pipeline
                .orchestrator
                .publish::<Resource>(&pipeline.records, staged, &fields)
                .await
                .expect("publish should succeed")
        }
    });
    let resources = join_all(publishes).await;

    let stored_names: HashSet<_> = resources.iter().map(|r| r.file.stored_name.clone()).collect();
    let keys: HashSet<_> = resources.iter().map(|r| r.file.storage.key.clone()).collect();
    assert_eq!(stored_names.len(), 8);
    assert_eq!(keys.len(), 8);
    assert!(resources.iter().all(|r| r.file.original_name == "same-name.pdf"));
    assert_eq!(pipeline.stored_files("resources"), 8);
    assert_eq!(pipeline.staged_files(), 0);
}

#[tokio::test]
async fn test_resolve_streams_published_bytes() {
    let pipeline = TestPipeline::new().await;
    let contents = b"%PDF-1.4 eligibility criteria";
    let staged = pipeline.stage(pdf("criteria.pdf", contents), &resource_limits()).await;
    let resource = pipeline
        .orchestrator
        .publish::<Resource>(&pipeline.records, staged, &resource_fields())
        .await
        .unwrap();

    let filter = Filter::all().eq("storedName", resource.file.stored_name.clone());
    let resolved = pipeline
        .orchestrator
        .resolve::<Resource>(&pipeline.records, &filter)
        .await
        .unwrap();

    assert_eq!(resolved.record.id, resource.id);
    assert_eq!(resolved.attachment.mime_type, "application/pdf");
    let chunks: Vec<_> = resolved.body.try_collect().await.unwrap();
    assert_eq!(chunks.concat(), contents.to_vec());

    let unknown = Filter::all().eq("storedName", "0-missing.pdf");
    let result = pipeline
        .orchestrator
        .resolve::<Resource>(&pipeline.records, &unknown)
        .await;
    assert!(matches!(result, Err(PublishError::NotFound(_))));
}

#[tokio::test]
async fn test_retract_removes_record_and_artifact() {
    let pipeline = TestPipeline::new().await;
    let staged = pipeline.stage(jpeg("demo.jpg", 4096), &image_limits()).await;
    let project = pipeline
        .orchestrator
        .publish::<ShowcaseProject>(&pipeline.records, staged, &project_fields("Drive Matcher"))
        .await
        .unwrap();
    let artifact = pipeline.artifact_path(&project.image.storage.key);
    assert!(artifact.exists());

    let retracted = pipeline
        .orchestrator
        .retract::<ShowcaseProject>(&pipeline.records, project.id)
        .await
        .unwrap();
    assert_eq!(retracted.id, project.id);
    assert!(!artifact.exists());

    let resolved = pipeline
        .orchestrator
        .resolve_by_id::<ShowcaseProject>(&pipeline.records, project.id)
        .await;
    assert!(matches!(resolved, Err(PublishError::NotFound(_))));

    let again = pipeline
        .orchestrator
        .retract::<ShowcaseProject>(&pipeline.records, project.id)
        .await;
    assert!(matches!(again, Err(PublishError::NotFound(_))));
}

#[tokio::test]
async fn test_retract_with_missing_artifact_still_deletes_record() {
    let pipeline = TestPipeline::new().await;
    let staged = pipeline.stage(pdf("rules.pdf", b"%PDF-1.4"), &resource_limits()).await;
    let resource = pipeline
        .orchestrator
        .publish::<Resource>(&pipeline.records, staged, &resource_fields())
        .await
        .unwrap();

    std::fs::remove_file(pipeline.artifact_path(&resource.file.storage.key)).unwrap();

    let resolved = pipeline
        .orchestrator
        .resolve_by_id::<Resource>(&pipeline.records, resource.id)
        .await;
    assert!(matches!(resolved, Err(PublishError::ArtifactMissing(_))));

    pipeline
        .orchestrator
        .retract::<Resource>(&pipeline.records, resource.id)
        .await
        .expect("retract should succeed without the artifact");
    assert_eq!(pipeline.records.count("resources").await, 0);
}

#[tokio::test]
async fn test_approving_twice_keeps_first_stamp() {
    let pipeline = TestPipeline::new().await;
    let records = &pipeline.records;
    let experience = pipeline
        .orchestrator
        .submit::<AlumniExperience>(records, &alumni_fields())
        .await
        .unwrap();
    assert_eq!(experience.moderation.status, ModerationStatus::Pending);

    let first =
        moderate::<AlumniExperience>(records, experience.id, ModerationStatus::Approved, "TPO")
            .await
            .unwrap();
    let second =
        moderate::<AlumniExperience>(records, experience.id, ModerationStatus::Approved, "Dean")
            .await
            .unwrap();

    assert_eq!(second.moderation.approved_by.as_deref(), Some("TPO"));
    assert_eq!(second.moderation.approved_at, first.moderation.approved_at);

    let stored = RecordStore::<AlumniExperience>::find_by_id(records, experience.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.moderation, first.moderation);

    let back =
        moderate::<AlumniExperience>(records, experience.id, ModerationStatus::Pending, "TPO")
            .await;
    assert!(matches!(back, Err(PublishError::InvalidTransition(_))));

    let rejected =
        moderate::<AlumniExperience>(records, experience.id, ModerationStatus::Rejected, "TPO")
            .await
            .unwrap();
    assert_eq!(rejected.moderation.approved_by, None);
    assert_eq!(rejected.moderation.approved_at, None);
}

#[tokio::test]
async fn test_moderating_unknown_record_is_not_found() {
    let pipeline = TestPipeline::new().await;
    let result = moderate::<ShowcaseProject>(
        &pipeline.records,
        uuid::Uuid::new_v4(),
        ModerationStatus::Approved,
        "TPO",
    )
    .await;
    assert!(matches!(result, Err(PublishError::NotFound(_))));
}

#[tokio::test]
async fn test_file_entities_cannot_be_submitted_without_a_file() {
    let pipeline = TestPipeline::new().await;
    let result = pipeline
        .orchestrator
        .submit::<ShowcaseProject>(&pipeline.records, &project_fields("Drive Matcher"))
        .await;
    assert!(matches!(result, Err(PublishError::MissingFile)));
}

#[tokio::test]
async fn test_alumni_publish_with_file_is_rejected_and_cleaned_up() {
    let pipeline = TestPipeline::new().await;
    let staged = pipeline.stage(pdf("offer.pdf", b"%PDF-1.4"), &resource_limits()).await;

    let result = pipeline
        .orchestrator
        .publish::<AlumniExperience>(&pipeline.records, staged, &alumni_fields())
        .await;

    assert!(matches!(result, Err(PublishError::InvalidInput(_))));
    assert_eq!(pipeline.staged_files(), 0);
    assert_eq!(pipeline.records.count("alumni_experiences").await, 0);
}

struct ChannelNotifier(mpsc::UnboundedSender<Notification>);

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<(), String> {
        self.0.send(notification.clone()).map_err(|e| e.to_string())
    }
}

#[tokio::test]
async fn test_published_project_notifies_admin() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outbox = NotificationOutbox::start(
        Arc::new(ChannelNotifier(tx)),
        NotificationOutboxConfig::default(),
    );
    let mut pipeline = TestPipeline::new().await;
    pipeline.orchestrator = pipeline.orchestrator.clone().with_notifications(outbox);

    let staged = pipeline.stage(jpeg("demo.jpg", 1024), &image_limits()).await;
    pipeline
        .orchestrator
        .publish::<ShowcaseProject>(&pipeline.records, staged, &project_fields("Drive Matcher"))
        .await
        .unwrap();

    let notification = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("notification should arrive")
        .unwrap();
    assert_eq!(notification.subject, "New Project Submission: Drive Matcher");
    assert!(notification.body.contains("meera@college.edu"));
    assert!(notification.body.contains("Rust, axum, Postgres"));
}
