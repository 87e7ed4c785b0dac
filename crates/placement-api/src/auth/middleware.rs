use crate::auth::models::AdminContext;
use crate::error::HttpAppError;
use crate::state::AuthState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use placement_core::AppError;

fn unauthorized(reason: &str) -> Response {
    tracing::warn!(reason = reason, "Rejected admin request");
    HttpAppError(AppError::Unauthorized(reason.to_string())).into_response()
}

/// Require `Authorization: Bearer <admin password>`; on success the request
/// carries an [`AdminContext`].
pub async fn admin_auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return unauthorized("Missing authorization header"),
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return unauthorized("Invalid authorization header format");
    };

    if !auth_state.credential.verify(token.trim()) {
        return unauthorized("Invalid admin credential");
    }

    request.extensions_mut().insert(AdminContext {
        actor: auth_state.credential.actor().to_string(),
    });
    next.run(request).await
}
