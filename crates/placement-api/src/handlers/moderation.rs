use crate::auth::AdminContext;
use placement_core::{AppError, ModerationStatus};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    /// `Approved` or `Rejected` (case-insensitive)
    pub status: String,
    /// Defaults to the authenticated admin
    pub approved_by: Option<String>,
}

impl StatusUpdateRequest {
    /// Target status and acting admin for this decision.
    pub fn decision(&self, admin: &AdminContext) -> Result<(ModerationStatus, String), AppError> {
        let target = self
            .status
            .parse::<ModerationStatus>()
            .map_err(AppError::InvalidInput)?;

        let actor = self
            .approved_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&admin.actor)
            .to_string();

        Ok((target, actor))
    }
}
