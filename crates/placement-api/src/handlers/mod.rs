pub mod alumni;
pub mod artifact;
pub mod moderation;
pub mod projects;
pub mod resources;
pub mod uploads;

use serde::Serialize;
use utoipa::ToSchema;

/// Acknowledgement body for deletes.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
