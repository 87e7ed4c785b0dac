//! Multipart form reading for publish requests.

use crate::error::HttpAppError;
use axum::extract::Multipart;
use placement_core::{AppError, FormFields, UploadLimits};
use placement_services::{IncomingFile, PublishError, StagedFile, UploadIntake};

/// The staged file and text fields of a publish form.
pub struct PublishForm {
    pub staged: StagedFile,
    pub fields: FormFields,
}

/// Read a multipart body, staging the part named `file_field` through upload
/// intake as it streams in and collecting every other part as text.
///
/// On any error the already-staged file is dropped, which removes it from disk.
pub async fn read_publish_form(
    mut multipart: Multipart,
    file_field: &str,
    intake: &UploadIntake,
    limits: &UploadLimits,
) -> Result<PublishForm, HttpAppError> {
    let mut staged: Option<StagedFile> = None;
    let mut fields = FormFields::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string).unwrap_or_default();

        if name == file_field {
            if staged.is_some() {
                return Err(AppError::InvalidInput(format!(
                    "Multiple file fields are not allowed; send exactly one field named '{}'",
                    file_field
                ))
                .into());
            }
            let part = IncomingFile::new(
                field.file_name().map(str::to_string),
                field.content_type().map(str::to_string),
                field,
            );
            staged = Some(intake.stage(Some(part), limits).await?);
        } else if field.file_name().is_some() {
            return Err(AppError::InvalidInput(format!(
                "Unexpected file field '{}'; the file must be sent as '{}'",
                name, file_field
            ))
            .into());
        } else if !name.is_empty() {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }

    let staged = staged.ok_or(PublishError::MissingFile)?;
    Ok(PublishForm { staged, fields })
}
