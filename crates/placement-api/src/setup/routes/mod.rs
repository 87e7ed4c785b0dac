//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

pub use health::{health_check, HealthCheckResponse, __path_health_check};

use crate::auth::admin_auth_middleware;
use crate::constants::{MULTIPART_OVERHEAD_BYTES, OPENAPI_PATH};
use crate::state::AppState;
use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use placement_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // route_layer keeps unmatched paths a 404 instead of a 401
    let admin_routes = domains::admin_routes().route_layer(
        axum::middleware::from_fn_with_state(state.auth.clone(), admin_auth_middleware),
    );

    let app_state_routes = domains::public_routes()
        .merge(admin_routes)
        .merge(health::health_routes());

    // Intake enforces the per-entity limits; this only bounds the whole request
    let body_limit = config.max_upload_size_bytes() + MULTIPART_OVERHEAD_BYTES;
    let http_concurrency_limit = config.http_concurrency_limit();
    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = http_concurrency_limit,
        "HTTP limits configured"
    );

    let app = app_state_routes
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid origin in CORS_ORIGINS")?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
