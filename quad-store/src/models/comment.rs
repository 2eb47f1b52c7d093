use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    collection::Document,
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::generate_document_id,
};

pub const MAX_COMMENT_LENGTH: usize = 1000;

fn validate_content(content: &str) -> ValidationResult<()> {
    let mut issues = Vec::new();
    if content.trim().is_empty() {
        issues.push(ValidationIssue::new("content", "validation.required", "content is required"));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        issues.push(ValidationIssue::new(
            "content",
            "validation.length",
            format!("length must be at most {MAX_COMMENT_LENGTH}"),
        ));
    }
    if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
}

/// Engagement on a post. The author's avatar and verification flag are
/// denormalized at creation time, matching what readers need to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub post_id: String,
    pub author_id: String,
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub user_avatar_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub replies_count: i64,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub username: String,
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_content(&self.content)
    }
}

impl Comment {
    pub fn from_submission(
        submission: NewComment,
        post_id: String,
        author_id: String,
        avatar_url: Option<String>,
        author_verified: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_document_id(),
            created_at: now,
            post_id,
            author_id,
            username: submission.username,
            content: submission.content,
            user_avatar_url: avatar_url,
            is_verified: author_verified,
            likes_count: 0,
            replies_count: 0,
            is_deleted: false,
        }
    }
}

impl Document for Comment {
    const COLLECTION: &'static str = "comments";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub comment_id: String,
    pub author_id: String,
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub user_avatar_url: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReply {
    pub username: String,
    pub content: String,
}

impl NewReply {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_content(&self.content)
    }
}

impl Reply {
    pub fn from_submission(
        submission: NewReply,
        comment_id: String,
        author_id: String,
        avatar_url: Option<String>,
        author_verified: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_document_id(),
            created_at: now,
            comment_id,
            author_id,
            username: submission.username,
            content: submission.content,
            user_avatar_url: avatar_url,
            is_verified: author_verified,
            likes_count: 0,
            is_deleted: false,
        }
    }
}

impl Document for Reply {
    const COLLECTION: &'static str = "replies";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
