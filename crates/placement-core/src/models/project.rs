use super::{Attachment, Moderated, Moderation, Record, Submission};
use crate::schema::{EntitySchema, ValidatedFields, Violations};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Submitter {
    pub name: String,
    pub email: String,
}

/// A student project submitted for the showcase, with one screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowcaseProject {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub technologies: Vec<String>,
    pub github_link: String,
    pub live_demo_link: Option<String>,
    pub submitted_by: Submitter,
    pub image: Attachment,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl Record for ShowcaseProject {
    const COLLECTION: &'static str = "projects";

    fn id(&self) -> Uuid {
        self.id
    }

    fn storage_key(&self) -> Option<&str> {
        Some(&self.image.storage.key)
    }
}

impl Submission for ShowcaseProject {
    const SCHEMA: EntitySchema = EntitySchema::ShowcaseProject;

    fn assemble(
        fields: &ValidatedFields,
        attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Result<Self, Violations> {
        let image = attachment.ok_or_else(|| Violations::single("image", "is required"))?;
        let technologies = fields
            .list("technologies")
            .map(<[String]>::to_vec)
            .ok_or_else(|| Violations::single("technologies", "must list at least one entry"))?;

        Ok(ShowcaseProject {
            id: Uuid::new_v4(),
            title: fields.require_text("title")?,
            short_description: fields.require_text("shortDescription")?,
            technologies,
            github_link: fields.require_text("githubLink")?,
            live_demo_link: fields.text("liveDemoLink").map(str::to_string),
            submitted_by: Submitter {
                name: fields.require_text("submittedByName")?,
                email: fields.require_text("submittedByEmail")?,
            },
            image,
            moderation: Moderation::pending(now),
        })
    }

    fn attachment(&self) -> Option<&Attachment> {
        Some(&self.image)
    }
}

impl Moderated for ShowcaseProject {
    fn moderation(&self) -> &Moderation {
        &self.moderation
    }

    fn moderation_mut(&mut self) -> &mut Moderation {
        &mut self.moderation
    }
}
