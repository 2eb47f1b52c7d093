use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    collection::Document,
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::{generate_document_id, generate_temp_id},
    validators::{is_valid_email, is_valid_url, is_valid_username},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarType {
    #[default]
    Generated,
    Uploaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// College affiliation, chosen from a fixed directory at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub profession: String,
}

/// A member of the network. The username doubles as the public identity;
/// everything else stays anonymous.
///
/// `followers_count` / `following_count` are denormalized from the Follow
/// ledger and mutated only inside the follow-toggle script, so they cannot
/// drift from the ledger on the paths this crate owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub username: String,
    #[serde(default)]
    pub avatar_type: AvatarType,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<College>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub interests: Vec<String>,
    pub recovery_email: String,
    #[serde(default)]
    pub is_email_verified: bool,
    /// One-time login code generated at registration.
    pub temp_id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub karma_points: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub followers_count: i64,
    #[serde(default)]
    pub following_count: i64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option", skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
}

/// Registration payload, validated before the document is built.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub avatar_type: AvatarType,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub college: Option<College>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub interests: Vec<String>,
    pub recovery_email: String,
}

impl NewUser {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        if !is_valid_username(&self.username) {
            issues.push(ValidationIssue::new(
                "username",
                "validation.username",
                "username must be 3-20 characters: letters, digits, underscores",
            ));
        }
        if !is_valid_email(&self.recovery_email) {
            issues.push(ValidationIssue::new(
                "recovery_email",
                "validation.email",
                "value must be a valid email address",
            ));
        }
        if !self.avatar_url.is_empty() && !is_valid_url(&self.avatar_url) {
            issues.push(ValidationIssue::new("avatar_url", "validation.url", "value must be a valid URL"));
        }
        if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
    }

    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: generate_document_id(),
            created_at: now,
            username: self.username,
            avatar_type: self.avatar_type,
            avatar_url: self.avatar_url,
            college: self.college,
            personal_info: self.personal_info,
            interests: self.interests,
            recovery_email: self.recovery_email,
            is_email_verified: false,
            temp_id: generate_temp_id(),
            role: Role::User,
            karma_points: 0,
            last_active: now,
            followers_count: 0,
            following_count: 0,
            is_verified: false,
            verified_at: None,
            verified_by: None,
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
