use super::{Attachment, Moderated, Moderation, Record, Submission};
use crate::schema::{EntitySchema, ValidatedFields, Violations};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An interview or placement write-up shared by a former student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlumniExperience {
    pub id: Uuid,
    pub alumni_name: String,
    pub alumni_email: Option<String>,
    pub batch: i32,
    pub company: String,
    pub role: String,
    pub experience: String,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl Record for AlumniExperience {
    const COLLECTION: &'static str = "alumni_experiences";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Submission for AlumniExperience {
    const SCHEMA: EntitySchema = EntitySchema::AlumniExperience;

    fn assemble(
        fields: &ValidatedFields,
        _attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Result<Self, Violations> {
        let batch = fields
            .integer("batch")
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| Violations::single("batch", "is required"))?;

        Ok(AlumniExperience {
            id: Uuid::new_v4(),
            alumni_name: fields.require_text("alumniName")?,
            alumni_email: fields.text("alumniEmail").map(str::to_string),
            batch,
            company: fields.require_text("company")?,
            role: fields.require_text("role")?,
            experience: fields.require_text("experience")?,
            moderation: Moderation::pending(now),
        })
    }

    fn attachment(&self) -> Option<&Attachment> {
        None
    }
}

impl Moderated for AlumniExperience {
    fn moderation(&self) -> &Moderation {
        &self.moderation
    }

    fn moderation_mut(&mut self) -> &mut Moderation {
        &mut self.moderation
    }
}
