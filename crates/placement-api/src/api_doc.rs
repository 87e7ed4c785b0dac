//! OpenAPI documentation, served at `crate::constants::OPENAPI_PATH`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use crate::setup::routes as health;
use placement_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the admin bearer scheme referenced by `security(("bearer_auth" = []))`.
struct AdminBearerAuth;

impl Modify for AdminBearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Admin password"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Placement Portal API",
        version = "0.1.0",
        description = "Placement office resources, student project showcase and alumni experiences. Uploads are staged, checked and published to permanent storage; student and alumni submissions wait for admin moderation."
    ),
    paths(
        health::health_check,
        // Resources
        handlers::resources::list_resources,
        handlers::resources::upload_resource,
        handlers::resources::download_resource,
        handlers::resources::delete_resource,
        // Projects
        handlers::projects::list_approved_projects,
        handlers::projects::submit_project,
        handlers::projects::list_all_projects,
        handlers::projects::project_image,
        handlers::projects::update_project_status,
        handlers::projects::delete_project,
        // Alumni experiences
        handlers::alumni::list_approved_experiences,
        handlers::alumni::submit_experience,
        handlers::alumni::list_all_experiences,
        handlers::alumni::update_experience_status,
        handlers::alumni::delete_experience,
        // Uploads
        handlers::uploads::stage_upload,
    ),
    components(
        schemas(
            models::Resource,
            models::ResourceCategory,
            models::ShowcaseProject,
            models::Submitter,
            models::AlumniExperience,
            models::Attachment,
            models::StoredArtifact,
            models::Moderation,
            models::ModerationStatus,
            handlers::moderation::StatusUpdateRequest,
            handlers::uploads::StagedUploadResponse,
            handlers::MessageResponse,
            health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&AdminBearerAuth),
    tags(
        (name = "health", description = "Service and dependency health"),
        (name = "resources", description = "Placement office documents: publish, list, download, retract"),
        (name = "projects", description = "Student project showcase with admin moderation"),
        (name = "alumni", description = "Alumni interview experiences with admin moderation"),
        (name = "uploads", description = "Run upload intake without publishing")
    )
)]
pub struct ApiDoc;
