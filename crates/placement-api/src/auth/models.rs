use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use placement_core::AppError;

/// Authenticated admin, stored in request extensions by the admin guard.
#[derive(Debug, Clone)]
pub struct AdminContext {
    /// Default `approvedBy` for moderation decisions
    pub actor: String,
}

// Extracted from request parts so it can be combined with Multipart
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AdminContext>()
            .cloned()
            .ok_or_else(|| {
                HttpAppError(AppError::Unauthorized(
                    "Admin credential required".to_string(),
                ))
            })
    }
}
