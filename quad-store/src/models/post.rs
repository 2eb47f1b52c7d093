use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    collection::Document,
    errors::{ValidationError, ValidationIssue, ValidationResult},
    id::generate_document_id,
    validators::is_valid_url,
};

pub const MAX_CONTENT_LENGTH: usize = 2000;
const MIN_POLL_OPTIONS: usize = 2;
const MAX_POLL_OPTIONS: usize = 6;

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Reference to media hosted by the external media service. Upload mechanics
/// live outside this crate; only the resulting URL is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub text: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub voters: Vec<String>,
}

/// Embedded poll. Voter lists are appended only by the poll-vote script,
/// which enforces one vote per user across all options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub options: Vec<PollOption>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes_count: i64,
    #[serde(default)]
    pub comments_count: i64,
    #[serde(default)]
    pub user_avatar_url: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<Poll>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
}

/// Poll options as submitted: text only, counters start at zero.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPollOption {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPoll {
    pub options: Vec<NewPollOption>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub username: String,
    pub content: String,
    #[serde(default)]
    pub poll: Option<NewPoll>,
    #[serde(default)]
    pub media: Option<MediaRef>,
}

/// Shared by creation and edit paths.
pub fn validate_content(content: &str) -> ValidationResult<()> {
    let mut issues = Vec::new();
    if content.trim().is_empty() {
        issues.push(ValidationIssue::new("content", "validation.required", "content is required"));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        issues.push(ValidationIssue::new(
            "content",
            "validation.length",
            format!("length must be at most {MAX_CONTENT_LENGTH}"),
        ));
    }
    if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
}

impl NewPost {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        if let Err(err) = validate_content(&self.content) {
            issues.extend(err.issues);
        }
        if let Some(poll) = &self.poll {
            let count = poll.options.len();
            if !(MIN_POLL_OPTIONS..=MAX_POLL_OPTIONS).contains(&count) {
                issues.push(ValidationIssue::new(
                    "poll.options",
                    "validation.length",
                    format!("polls need between {MIN_POLL_OPTIONS} and {MAX_POLL_OPTIONS} options"),
                ));
            }
            if poll.options.iter().any(|option| option.text.trim().is_empty()) {
                issues.push(ValidationIssue::new(
                    "poll.options",
                    "validation.required",
                    "poll options must not be empty",
                ));
            }
            if poll.ends_at <= Utc::now() {
                issues.push(ValidationIssue::new(
                    "poll.ends_at",
                    "validation.range",
                    "poll must end in the future",
                ));
            }
        }
        if let Some(media) = &self.media
            && !is_valid_url(&media.url) {
                issues.push(ValidationIssue::new("media.url", "validation.url", "value must be a valid URL"));
            }
        if issues.is_empty() { Ok(()) } else { Err(ValidationError::new(issues)) }
    }
}

impl Post {
    /// Builds the document for a validated submission; tags are derived from
    /// hashtags in the content.
    pub fn from_submission(submission: NewPost, author_id: String, avatar_url: Option<String>, now: DateTime<Utc>) -> Self {
        let tags = extract_hashtags(&submission.content);
        let poll = submission.poll.map(|poll| Poll {
            options: poll
                .options
                .into_iter()
                .map(|option| PollOption {
                    text: option.text,
                    votes: 0,
                    voters: Vec::new(),
                })
                .collect(),
            ends_at: poll.ends_at,
        });
        Self {
            id: generate_document_id(),
            created_at: now,
            author_id,
            username: submission.username,
            content: submission.content,
            tags,
            likes_count: 0,
            comments_count: 0,
            user_avatar_url: avatar_url,
            is_deleted: false,
            poll,
            media: submission.media,
        }
    }
}

/// Extracts `#hashtag` tokens from content, deduplicated in first-seen order.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for capture in HASHTAG_RE.captures_iter(content) {
        let tag = capture[1].to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

impl Document for Post {
    const COLLECTION: &'static str = "posts";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
