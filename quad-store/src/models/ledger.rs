//! Engagement ledger records.
//!
//! A ledger record is the source of truth for a relationship; the pair key
//! written next to it enforces at-most-one record per participant pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{collection::Document, id::generate_document_id};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub post_id: String,
    /// User id of the actor.
    pub liked_by: String,
}

impl Like {
    pub fn new(post_id: String, liked_by: String, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_document_id(),
            created_at: now,
            post_id,
            liked_by,
        }
    }
}

impl Document for Like {
    const COLLECTION: &'static str = "likes";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowState {
    #[default]
    Active,
    Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// User id of the actor.
    pub follower: String,
    /// User id of the target.
    pub following: String,
    #[serde(default)]
    pub status: FollowState,
}

impl Follow {
    pub fn new(follower: String, following: String, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_document_id(),
            created_at: now,
            follower,
            following,
            status: FollowState::Active,
        }
    }
}

impl Document for Follow {
    const COLLECTION: &'static str = "follows";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
