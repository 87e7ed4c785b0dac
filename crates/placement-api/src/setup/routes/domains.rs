//! Domain route groups: open to students and visitors, or behind the admin guard.

use crate::constants::API_PREFIX;
use crate::handlers::{alumni, projects, resources, uploads};
use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::sync::Arc;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/resources", API_PREFIX),
            get(resources::list_resources),
        )
        .route(
            &format!("{}/resources/download/{{storedName}}", API_PREFIX),
            get(resources::download_resource),
        )
        .route(
            &format!("{}/projects", API_PREFIX),
            get(projects::list_approved_projects).post(projects::submit_project),
        )
        .route(
            &format!("{}/projects/{{id}}/image", API_PREFIX),
            get(projects::project_image),
        )
        .route(
            &format!("{}/alumni-experiences", API_PREFIX),
            get(alumni::list_approved_experiences).post(alumni::submit_experience),
        )
        .route(
            &format!("{}/uploads/stage", API_PREFIX),
            post(uploads::stage_upload),
        )
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/resources/upload", API_PREFIX),
            post(resources::upload_resource),
        )
        .route(
            &format!("{}/resources/{{id}}", API_PREFIX),
            delete(resources::delete_resource),
        )
        .route(
            &format!("{}/projects/admin", API_PREFIX),
            get(projects::list_all_projects),
        )
        .route(
            &format!("{}/projects/{{id}}/status", API_PREFIX),
            patch(projects::update_project_status),
        )
        .route(
            &format!("{}/projects/{{id}}", API_PREFIX),
            delete(projects::delete_project),
        )
        .route(
            &format!("{}/alumni-experiences/admin", API_PREFIX),
            get(alumni::list_all_experiences),
        )
        .route(
            &format!("{}/alumni-experiences/{{id}}/status", API_PREFIX),
            patch(alumni::update_experience_status),
        )
        .route(
            &format!("{}/alumni-experiences/{{id}}", API_PREFIX),
            delete(alumni::delete_experience),
        )
}
