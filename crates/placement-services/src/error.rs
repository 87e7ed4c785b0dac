//! Failures of the upload-and-publish pipeline.

use placement_core::{AppError, TransitionError, Violations};
use thiserror::Error;

/// Rejections produced by the upload intake before anything reaches storage.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("File exceeds the maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },

    #[error("File type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("Failed to stage upload: {0}")]
    StagingIo(String),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("File exceeds the maximum size of {max_bytes} bytes")]
    FileTooLarge { max_bytes: usize },

    #[error("File type '{0}' is not allowed")]
    UnsupportedType(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] Violations),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("Failed to stage upload: {0}")]
    StagingIo(String),

    #[error("Transfer to permanent storage failed: {0}")]
    StorageTransfer(String),

    #[error("Failed to persist record: {0}")]
    Persistence(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Artifact missing from storage: {0}")]
    ArtifactMissing(String),

    #[error("Failed to remove artifact: {0}")]
    Retract(String),
}

impl From<IntakeError> for PublishError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::MissingFile => PublishError::MissingFile,
            IntakeError::FileTooLarge { max_bytes } => PublishError::FileTooLarge { max_bytes },
            IntakeError::UnsupportedType(mime) => PublishError::UnsupportedType(mime),
            IntakeError::StagingIo(msg) => PublishError::StagingIo(msg),
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        PublishError::from(err).into()
    }
}

const MIB: usize = 1024 * 1024;

/// Whole MiB when the limit is at least one, bytes otherwise.
fn describe_limit(max_bytes: usize) -> String {
    if max_bytes >= MIB && max_bytes % MIB == 0 {
        format!("{} MB", max_bytes / MIB)
    } else {
        format!("{} bytes", max_bytes)
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::MissingFile => AppError::MissingFile("No file was uploaded".to_string()),
            PublishError::FileTooLarge { max_bytes } => AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {}",
                describe_limit(max_bytes)
            )),
            PublishError::UnsupportedType(mime) => {
                AppError::UnsupportedMediaType(format!("File type '{}' is not allowed", mime))
            }
            PublishError::InvalidInput(msg) => AppError::InvalidInput(msg),
            PublishError::Validation(v) => AppError::Validation(v.to_string()),
            PublishError::InvalidTransition(t) => t.into(),
            PublishError::StagingIo(msg) => AppError::StagingIo(msg),
            PublishError::StorageTransfer(msg) => AppError::StorageTransfer(msg),
            PublishError::Persistence(msg) => AppError::Persistence(msg),
            PublishError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            PublishError::ArtifactMissing(msg) => AppError::ArtifactMissing(msg),
            PublishError::Retract(msg) => AppError::Retract(msg),
        }
    }
}
