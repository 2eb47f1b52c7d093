use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    collection::Document,
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::generate_document_id,
};

/// Admin-managed post category. Name is unique case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub description: String,
}

impl NewCategory {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        for (field, value) in [("name", &self.name), ("icon", &self.icon), ("description", &self.description)] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::new(field, "validation.required", format!("{field} is required")));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
    }

    pub fn into_category(self, now: DateTime<Utc>) -> Category {
        Category {
            id: generate_document_id(),
            created_at: now,
            name: self.name,
            icon: self.icon,
            description: self.description,
        }
    }
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
