//! Intake-only endpoint: stages a file under the entity's limits and reports
//! what was accepted without publishing anything.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::read_publish_form;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use placement_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct StageQuery {
    /// `resource` or `project`
    pub entity: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StagedUploadResponse {
    pub stored_name: String,
    pub original_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[utoipa::path(
    post,
    path = "/api/uploads/stage",
    tag = "uploads",
    params(StageQuery),
    request_body(content_type = "multipart/form-data", description = "`file` for resources, `image` for projects"),
    responses(
        (status = 200, description = "File accepted by intake", body = StagedUploadResponse),
        (status = 400, description = "Missing file or unknown entity", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(entity = %query.entity))]
pub async fn stage_upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StageQuery>,
    multipart: Multipart,
) -> Result<Json<StagedUploadResponse>, HttpAppError> {
    let uploads = &state.uploads;
    let (file_field, limits) = match query.entity.to_lowercase().as_str() {
        "resource" => ("file", &uploads.resource_limits),
        "project" => ("image", &uploads.project_image_limits),
        other => {
            return Err(AppError::InvalidInput(format!(
                "Unknown entity '{}'; expected 'resource' or 'project'",
                other
            ))
            .into())
        }
    };

    let form = read_publish_form(multipart, file_field, &uploads.intake, limits).await?;
    let staged = form.staged;

    let response = StagedUploadResponse {
        stored_name: staged.stored_name().to_string(),
        original_name: staged.original_name().to_string(),
        size_bytes: staged.size_bytes(),
        mime_type: staged.mime_type().to_string(),
    };

    if let Err(e) = staged.discard() {
        tracing::warn!(error = %e, stored_name = %response.stored_name, "Failed to remove staged file");
    }

    Ok(Json(response))
}
