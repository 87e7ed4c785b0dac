use crate::auth::AdminContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::artifact::{stream_response, Disposition};
use crate::handlers::moderation::StatusUpdateRequest;
use crate::handlers::MessageResponse;
use crate::state::AppState;
use crate::utils::multipart::read_publish_form;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use placement_core::{ModerationStatus, ShowcaseProject};
use placement_db::{Filter, SortKey};
use placement_services::moderate;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    responses(
        (status = 200, description = "Approved projects, most recently approved first", body = Vec<ShowcaseProject>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_approved_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowcaseProject>>, HttpAppError> {
    let projects = state
        .db
        .projects
        .find_many(
            &Filter::all().eq("status", ModerationStatus::Approved.to_string()),
            &[
                SortKey::newest_first("approvedAt"),
                SortKey::newest_first("submittedAt"),
            ],
        )
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body(
        content_type = "multipart/form-data",
        description = "`image` plus `title`, `shortDescription`, `technologies`, `githubLink`, `liveDemoLink`, `submittedByName`, `submittedByEmail`"
    ),
    responses(
        (status = 201, description = "Project submitted for review", body = ShowcaseProject),
        (status = 400, description = "Missing image or invalid metadata", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse),
        (status = 415, description = "Unsupported image type", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "submit_project"))]
pub async fn submit_project(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let uploads = &state.uploads;
    let form = read_publish_form(
        multipart,
        "image",
        &uploads.intake,
        &uploads.project_image_limits,
    )
    .await?;

    let project = uploads
        .orchestrator
        .publish::<ShowcaseProject>(state.db.projects.as_ref(), form.staged, &form.fields)
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects/admin",
    tag = "projects",
    responses(
        (status = 200, description = "All projects, newest submission first", body = Vec<ShowcaseProject>),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn list_all_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShowcaseProject>>, HttpAppError> {
    let projects = state
        .db
        .projects
        .find_many(&Filter::all(), &[SortKey::newest_first("submittedAt")])
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}/image",
    tag = "projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project screenshot", content_type = "image/*"),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(project_id = %id))]
pub async fn project_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let resolved = state
        .uploads
        .orchestrator
        .resolve_by_id::<ShowcaseProject>(state.db.projects.as_ref(), id)
        .await?;

    stream_response(resolved, Disposition::Inline)
}

#[utoipa::path(
    patch,
    path = "/api/projects/{id}/status",
    tag = "projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Project after the decision", body = ShowcaseProject),
        (status = 400, description = "Unknown status or transition not allowed", body = ErrorResponse),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(project_id = %id))]
pub async fn update_project_status(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<ShowcaseProject>, HttpAppError> {
    let (target, actor) = request.decision(&admin)?;
    let project = moderate::<ShowcaseProject>(state.db.projects.as_ref(), id, target, &actor).await?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(
        ("id" = Uuid, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project and image deleted", body = MessageResponse),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(project_id = %id))]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    state
        .uploads
        .orchestrator
        .retract::<ShowcaseProject>(state.db.projects.as_ref(), id)
        .await?;

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
