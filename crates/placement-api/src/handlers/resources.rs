use crate::auth::AdminContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::artifact::{stream_response, Disposition};
use crate::handlers::MessageResponse;
use crate::state::AppState;
use crate::utils::multipart::read_publish_form;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use placement_core::Resource;
use placement_db::{Filter, SortKey};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/resources",
    tag = "resources",
    responses(
        (status = 200, description = "All resources, newest upload first", body = Vec<Resource>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Resource>>, HttpAppError> {
    let resources = state
        .db
        .resources
        .find_many(&Filter::all(), &[SortKey::newest_first("uploadDate")])
        .await?;
    Ok(Json(resources))
}

#[utoipa::path(
    post,
    path = "/api/resources/upload",
    tag = "resources",
    request_body(content_type = "multipart/form-data", description = "`file` plus optional `category`, `description`, `uploadedBy`"),
    responses(
        (status = 201, description = "Resource published", body = Resource),
        (status = 400, description = "Missing file or invalid metadata", body = ErrorResponse),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_resource"))]
pub async fn upload_resource(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploads = &state.uploads;
    let mut form =
        read_publish_form(multipart, "file", &uploads.intake, &uploads.resource_limits).await?;

    if form.fields.get("uploadedBy").is_none() {
        form.fields.insert("uploadedBy", admin.actor);
    }

    let resource = uploads
        .orchestrator
        .publish::<Resource>(state.db.resources.as_ref(), form.staged, &form.fields)
        .await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

#[utoipa::path(
    get,
    path = "/api/resources/download/{storedName}",
    tag = "resources",
    params(
        ("storedName" = String, Path, description = "Generated stored name of the file")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn download_resource(
    State(state): State<Arc<AppState>>,
    Path(stored_name): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let resolved = state
        .uploads
        .orchestrator
        .resolve::<Resource>(
            state.db.resources.as_ref(),
            &Filter::all().eq("storedName", stored_name),
        )
        .await?;

    stream_response(resolved, Disposition::Attachment)
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    tag = "resources",
    params(
        ("id" = Uuid, Path, description = "Resource ID")
    ),
    responses(
        (status = 200, description = "Resource and file deleted", body = MessageResponse),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 404, description = "Resource not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(resource_id = %id))]
pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    state
        .uploads
        .orchestrator
        .retract::<Resource>(state.db.resources.as_ref(), id)
        .await?;

    Ok(Json(MessageResponse::new(
        "Resource and file deleted successfully",
    )))
}
