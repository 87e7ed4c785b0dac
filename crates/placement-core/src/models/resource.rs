use super::{Attachment, Record, Submission};
use crate::schema::{EntitySchema, ValidatedFields, Violations};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ResourceCategory {
    Guidelines,
    #[serde(rename = "Company Info")]
    CompanyInfo,
    #[serde(rename = "Prep Materials")]
    PrepMaterials,
    #[default]
    Other,
}

impl ResourceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceCategory::Guidelines => "Guidelines",
            ResourceCategory::CompanyInfo => "Company Info",
            ResourceCategory::PrepMaterials => "Prep Materials",
            ResourceCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Guidelines" => Ok(ResourceCategory::Guidelines),
            "Company Info" => Ok(ResourceCategory::CompanyInfo),
            "Prep Materials" => Ok(ResourceCategory::PrepMaterials),
            "Other" => Ok(ResourceCategory::Other),
            other => Err(format!("Unknown resource category: {}", other)),
        }
    }
}

/// A downloadable document published by the placement office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    #[serde(flatten)]
    pub file: Attachment,
    pub category: ResourceCategory,
    pub description: Option<String>,
    pub uploaded_by: String,
    pub upload_date: DateTime<Utc>,
}

impl Record for Resource {
    const COLLECTION: &'static str = "resources";

    fn id(&self) -> Uuid {
        self.id
    }

    fn storage_key(&self) -> Option<&str> {
        Some(&self.file.storage.key)
    }
}

impl Submission for Resource {
    const SCHEMA: EntitySchema = EntitySchema::Resource;

    fn assemble(
        fields: &ValidatedFields,
        attachment: Option<Attachment>,
        now: DateTime<Utc>,
    ) -> Result<Self, Violations> {
        let file = attachment.ok_or_else(|| Violations::single("file", "is required"))?;
        let category = fields
            .text("category")
            .map(ResourceCategory::from_str)
            .transpose()
            .map_err(|e| Violations::single("category", e))?
            .unwrap_or_default();

        Ok(Resource {
            id: Uuid::new_v4(),
            file,
            category,
            description: fields.text("description").map(str::to_string),
            uploaded_by: fields.text("uploadedBy").unwrap_or("Admin").to_string(),
            upload_date: now,
        })
    }

    fn attachment(&self) -> Option<&Attachment> {
        Some(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoredArtifact;
    use crate::schema::FormFields;
    use crate::StorageBackend;

    fn attachment() -> Attachment {
        Attachment {
            original_name: "Placement Policy.pdf".to_string(),
            stored_name: "1700000000000-abc123.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size_bytes: 2048,
            storage: StoredArtifact {
                key: "resources/1700000000000-abc123.pdf".to_string(),
                location: "http://localhost:4000/uploads/resources/1700000000000-abc123.pdf"
                    .to_string(),
                backend: StorageBackend::Local,
            },
        }
    }

    #[test]
    fn assembles_with_defaults() {
        let fields = EntitySchema::Resource
            .validate(&FormFields::new().with("description", "2025 drive rules"))
            .unwrap();
        let now = Utc::now();
        let resource = Resource::assemble(&fields, Some(attachment()), now).unwrap();
        assert_eq!(resource.category, ResourceCategory::Other);
        assert_eq!(resource.uploaded_by, "Admin");
        assert_eq!(resource.upload_date, now);
        assert_eq!(
            resource.storage_key(),
            Some("resources/1700000000000-abc123.pdf")
        );
    }

    #[test]
    fn requires_a_file() {
        let fields = EntitySchema::Resource.validate(&FormFields::new()).unwrap();
        let err = Resource::assemble(&fields, None, Utc::now()).unwrap_err();
        assert_eq!(err.fields(), vec!["file"]);
    }

    #[test]
    fn serializes_flat_with_display_category() {
        let fields = EntitySchema::Resource
            .validate(&FormFields::new().with("category", "Company Info"))
            .unwrap();
        let resource = Resource::assemble(&fields, Some(attachment()), Utc::now()).unwrap();
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["category"], "Company Info");
        assert_eq!(json["storedName"], "1700000000000-abc123.pdf");
        assert_eq!(json["storage"]["key"], "resources/1700000000000-abc123.pdf");

        let back: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(back, resource);
    }
}
