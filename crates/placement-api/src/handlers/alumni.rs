use crate::auth::AdminContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::handlers::moderation::StatusUpdateRequest;
use crate::handlers::MessageResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use placement_core::{AlumniExperience, FormFields, ModerationStatus};
use placement_db::{Filter, SortKey};
use placement_services::moderate;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/alumni-experiences",
    tag = "alumni",
    responses(
        (status = 200, description = "Approved alumni experiences", body = Vec<AlumniExperience>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_approved_experiences(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlumniExperience>>, HttpAppError> {
    let experiences = state
        .db
        .alumni
        .find_many(
            &Filter::all().eq("status", ModerationStatus::Approved.to_string()),
            &[
                SortKey::newest_first("approvedAt"),
                SortKey::newest_first("submittedAt"),
            ],
        )
        .await?;
    Ok(Json(experiences))
}

#[utoipa::path(
    post,
    path = "/api/alumni-experiences",
    tag = "alumni",
    request_body(
        content = Object,
        description = "`alumniName`, `alumniEmail`, `batch`, `company`, `role`, `experience`"
    ),
    responses(
        (status = 201, description = "Experience submitted for review", body = AlumniExperience),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(operation = "submit_alumni_experience"))]
pub async fn submit_experience(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<Map<String, Value>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let fields = FormFields::from_json(&body);
    let experience = state
        .uploads
        .orchestrator
        .submit::<AlumniExperience>(state.db.alumni.as_ref(), &fields)
        .await?;

    Ok((StatusCode::CREATED, Json(experience)))
}

#[utoipa::path(
    get,
    path = "/api/alumni-experiences/admin",
    tag = "alumni",
    responses(
        (status = 200, description = "All experiences, newest submission first", body = Vec<AlumniExperience>),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn list_all_experiences(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AlumniExperience>>, HttpAppError> {
    let experiences = state
        .db
        .alumni
        .find_many(&Filter::all(), &[SortKey::newest_first("submittedAt")])
        .await?;
    Ok(Json(experiences))
}

#[utoipa::path(
    patch,
    path = "/api/alumni-experiences/{id}/status",
    tag = "alumni",
    params(
        ("id" = Uuid, Path, description = "Alumni experience ID")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Experience after the decision", body = AlumniExperience),
        (status = 400, description = "Unknown status or transition not allowed", body = ErrorResponse),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 404, description = "Experience not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, request), fields(experience_id = %id))]
pub async fn update_experience_status(
    State(state): State<Arc<AppState>>,
    admin: AdminContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<StatusUpdateRequest>,
) -> Result<Json<AlumniExperience>, HttpAppError> {
    let (target, actor) = request.decision(&admin)?;
    let experience =
        moderate::<AlumniExperience>(state.db.alumni.as_ref(), id, target, &actor).await?;
    Ok(Json(experience))
}

#[utoipa::path(
    delete,
    path = "/api/alumni-experiences/{id}",
    tag = "alumni",
    params(
        ("id" = Uuid, Path, description = "Alumni experience ID")
    ),
    responses(
        (status = 200, description = "Experience deleted", body = MessageResponse),
        (status = 401, description = "Admin credential required", body = ErrorResponse),
        (status = 404, description = "Experience not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(experience_id = %id))]
pub async fn delete_experience(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    state
        .uploads
        .orchestrator
        .retract::<AlumniExperience>(state.db.alumni.as_ref(), id)
        .await?;

    Ok(Json(MessageResponse::new(
        "Alumni experience deleted successfully",
    )))
}
