use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    collection::Document,
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::generate_document_id,
    models::user::College,
};

const MAX_GROUP_NAME_LENGTH: usize = 80;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: String,
    /// User id of the creator, who is always the first member.
    pub created_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<College>,
    /// User ids with set semantics; mutated only by the group-member script.
    #[serde(default)]
    pub members: Vec<String>,
}

impl Group {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub username: String,
}

impl NewGroup {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::new("name", "validation.required", "name is required"));
        }
        if self.name.chars().count() > MAX_GROUP_NAME_LENGTH {
            issues.push(ValidationIssue::new(
                "name",
                "validation.length",
                format!("length must be at most {MAX_GROUP_NAME_LENGTH}"),
            ));
        }
        if self.description.trim().is_empty() {
            issues.push(ValidationIssue::new(
                "description",
                "validation.required",
                "description is required",
            ));
        }
        if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
    }

    pub fn into_group(self, created_by: String, college: Option<College>, now: DateTime<Utc>) -> Group {
        Group {
            id: generate_document_id(),
            created_at: now,
            name: self.name,
            description: self.description,
            created_by: created_by.clone(),
            college,
            members: vec![created_by],
        }
    }
}

impl Document for Group {
    const COLLECTION: &'static str = "groups";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
