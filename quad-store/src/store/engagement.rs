//! Likes, follows, comments, and replies.
//!
//! Every mutation here pairs a ledger write with its counter adjustment in
//! one script invocation, so counters cannot drift from the ledger on the
//! paths this crate owns.

use chrono::Utc;
use redis::{aio::ConnectionManager, cmd};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

use crate::{
    errors::{StoreError, ValidationError},
    models::{Comment, Follow, Like, NewComment, NewReply, Reply},
    scripts::{COMMENT_CREATE_SCRIPT, FOLLOW_TOGGLE_SCRIPT, LIKE_TOGGLE_SCRIPT, UNLIKE_SCRIPT, run_script},
    store::Store,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeAction {
    Liked,
    Unliked,
}

#[derive(Debug, Clone, Serialize)]
pub struct LikeOutcome {
    pub action: LikeAction,
    pub likes_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowAction {
    Follow,
    Unfollow,
}

/// Counters after a follow toggle: the actor's following count and the
/// target's follower count.
#[derive(Debug, Clone, Serialize)]
pub struct FollowOutcome {
    pub action: FollowAction,
    pub following_count: i64,
    pub followers_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowStatusView {
    pub is_following: bool,
    pub followers_count: i64,
    pub following_count: i64,
}

#[derive(Debug, Serialize)]
struct LikeToggleCommand {
    post_key: String,
    post_id: String,
    pair_key: String,
    like_key: String,
    like_id: String,
    like_json: String,
    index_key: String,
    score: i64,
}

#[derive(Debug, Serialize)]
struct UnlikeCommand {
    post_key: String,
    post_id: String,
    pair_key: String,
    index_key: String,
}

#[derive(Debug, Serialize)]
struct FollowToggleCommand {
    follower_key: String,
    follower_id: String,
    target_key: String,
    target_id: String,
    pair_key: String,
    follow_key: String,
    follow_id: String,
    follow_json: String,
    index_key: String,
    score: i64,
}

#[derive(Debug, Serialize)]
struct CommentCreateCommand {
    parent_key: String,
    parent_id: String,
    counter_path: String,
    comment_key: String,
    comment_id: String,
    comment_json: String,
    index_key: String,
    score: i64,
}

fn count_field(value: &Value, field: &str) -> i64 {
    value.get(field).and_then(|v| v.as_i64()).unwrap_or_default()
}

impl Store {
    /// Toggles the actor's like on a post. Returns the action performed and
    /// the post's updated like count.
    pub async fn toggle_like(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        username: &str,
    ) -> Result<LikeOutcome, StoreError> {
        let user = self.fetch_user_by_username(conn, username).await?;
        let likes = self.likes();
        let like = Like::new(post_id.to_string(), user.id.clone(), Utc::now());
        let like_json = serde_json::to_string(&like).map_err(|err| StoreError::Other {
            message: Cow::Owned(format!("failed to serialize document: {err}")),
        })?;

        let command = LikeToggleCommand {
            post_key: self.posts().entity_key(post_id),
            post_id: post_id.to_string(),
            pair_key: likes.pair_key(post_id, &user.id),
            like_key: likes.entity_key(&like.id),
            like_id: like.id.clone(),
            like_json,
            index_key: likes.scoped_index_key(post_id),
            score: like.created_at.timestamp_millis(),
        };
        let value = run_script(conn, &LIKE_TOGGLE_SCRIPT, &command).await?;

        let action = match value.get("action").and_then(|v| v.as_str()) {
            Some("liked") => LikeAction::Liked,
            _ => LikeAction::Unliked,
        };
        Ok(LikeOutcome {
            action,
            likes_count: count_field(&value, "likes_count"),
        })
    }

    /// Removes an existing like; fails with `NotFound` when the actor has
    /// not liked the post.
    pub async fn unlike(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        username: &str,
    ) -> Result<LikeOutcome, StoreError> {
        let user = self.fetch_user_by_username(conn, username).await?;
        let likes = self.likes();
        let command = UnlikeCommand {
            post_key: self.posts().entity_key(post_id),
            post_id: post_id.to_string(),
            pair_key: likes.pair_key(post_id, &user.id),
            index_key: likes.scoped_index_key(post_id),
        };
        let value = run_script(conn, &UNLIKE_SCRIPT, &command).await?;
        Ok(LikeOutcome {
            action: LikeAction::Unliked,
            likes_count: count_field(&value, "likes_count"),
        })
    }

    pub async fn has_liked(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        username: &str,
    ) -> Result<bool, StoreError> {
        let user = self.fetch_user_by_username(conn, username).await?;
        let pair_key = self.likes().pair_key(post_id, &user.id);
        let exists: i64 = cmd("EXISTS").arg(&pair_key).query_async(conn).await?;
        Ok(exists == 1)
    }

    /// Toggles a follow edge between two usernames. Self-follow is rejected
    /// before any lookup.
    pub async fn toggle_follow(
        &self,
        conn: &mut ConnectionManager,
        follower_username: &str,
        target_username: &str,
    ) -> Result<FollowOutcome, StoreError> {
        if follower_username.eq_ignore_ascii_case(target_username) {
            return Err(ValidationError::single(
                "username",
                "validation.self_follow",
                "users cannot follow themselves",
            )
            .into());
        }

        let follower = self.fetch_user_by_username(conn, follower_username).await?;
        let target = self.fetch_user_by_username(conn, target_username).await?;
        let follows = self.follows();

        let follow = Follow::new(follower.id.clone(), target.id.clone(), Utc::now());
        let follow_json = serde_json::to_string(&follow).map_err(|err| StoreError::Other {
            message: Cow::Owned(format!("failed to serialize document: {err}")),
        })?;

        let users = self.users();
        let command = FollowToggleCommand {
            follower_key: users.entity_key(&follower.id),
            follower_id: follower.id.clone(),
            target_key: users.entity_key(&target.id),
            target_id: target.id.clone(),
            pair_key: follows.pair_key(&follower.id, &target.id),
            follow_key: follows.entity_key(&follow.id),
            follow_id: follow.id.clone(),
            follow_json,
            index_key: follows.scoped_index_key(&follower.id),
            score: follow.created_at.timestamp_millis(),
        };
        let value = run_script(conn, &FOLLOW_TOGGLE_SCRIPT, &command).await?;

        let action = match value.get("action").and_then(|v| v.as_str()) {
            Some("follow") => FollowAction::Follow,
            _ => FollowAction::Unfollow,
        };
        Ok(FollowOutcome {
            action,
            following_count: count_field(&value, "following_count"),
            followers_count: count_field(&value, "followers_count"),
        })
    }

    /// Whether `follower_username` follows `target_username`, plus the
    /// target's current counters.
    pub async fn follow_status(
        &self,
        conn: &mut ConnectionManager,
        follower_username: &str,
        target_username: &str,
    ) -> Result<FollowStatusView, StoreError> {
        let follower = self.fetch_user_by_username(conn, follower_username).await?;
        let target = self.fetch_user_by_username(conn, target_username).await?;
        let pair_key = self.follows().pair_key(&follower.id, &target.id);
        let exists: i64 = cmd("EXISTS").arg(&pair_key).query_async(conn).await?;
        Ok(FollowStatusView {
            is_following: exists == 1,
            followers_count: target.followers_count,
            following_count: target.following_count,
        })
    }

    /// Adds a comment to a post and bumps `comments_count` in the same step.
    pub async fn create_comment(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        submission: NewComment,
    ) -> Result<Comment, StoreError> {
        submission.validate()?;
        let author = self.fetch_user_by_username(conn, &submission.username).await?;
        let avatar_url = (!author.avatar_url.is_empty()).then(|| author.avatar_url.clone());
        let comment = Comment::from_submission(
            submission,
            post_id.to_string(),
            author.id.clone(),
            avatar_url,
            author.is_verified,
            Utc::now(),
        );
        let comment_json = serde_json::to_string(&comment).map_err(|err| StoreError::Other {
            message: Cow::Owned(format!("failed to serialize document: {err}")),
        })?;

        let comments = self.comments();
        let command = CommentCreateCommand {
            parent_key: self.posts().entity_key(post_id),
            parent_id: post_id.to_string(),
            counter_path: "$.comments_count".to_string(),
            comment_key: comments.entity_key(&comment.id),
            comment_id: comment.id.clone(),
            comment_json,
            index_key: comments.scoped_index_key(post_id),
            score: comment.created_at.timestamp_millis(),
        };
        run_script(conn, &COMMENT_CREATE_SCRIPT, &command).await?;
        Ok(comment)
    }

    /// A post's comments, newest first, tombstoned ones excluded.
    pub async fn list_comments(
        &self,
        conn: &mut ConnectionManager,
        post_id: &str,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<Comment>, StoreError> {
        let comments = self.comments();
        let index = comments.scoped_index_key(post_id);
        let page = comments.list_page(conn, &index, offset, limit, true).await?;
        Ok(page.into_iter().filter(|comment| !comment.is_deleted).collect())
    }

    /// Adds a reply under a comment and bumps `replies_count` in the same step.
    pub async fn create_reply(
        &self,
        conn: &mut ConnectionManager,
        comment_id: &str,
        submission: NewReply,
    ) -> Result<Reply, StoreError> {
        submission.validate()?;
        let author = self.fetch_user_by_username(conn, &submission.username).await?;
        let avatar_url = (!author.avatar_url.is_empty()).then(|| author.avatar_url.clone());
        let reply = Reply::from_submission(
            submission,
            comment_id.to_string(),
            author.id.clone(),
            avatar_url,
            author.is_verified,
            Utc::now(),
        );
        let reply_json = serde_json::to_string(&reply).map_err(|err| StoreError::Other {
            message: Cow::Owned(format!("failed to serialize document: {err}")),
        })?;

        let replies = self.replies();
        let command = CommentCreateCommand {
            parent_key: self.comments().entity_key(comment_id),
            parent_id: comment_id.to_string(),
            counter_path: "$.replies_count".to_string(),
            comment_key: replies.entity_key(&reply.id),
            comment_id: reply.id.clone(),
            comment_json: reply_json,
            index_key: replies.scoped_index_key(comment_id),
            score: reply.created_at.timestamp_millis(),
        };
        run_script(conn, &COMMENT_CREATE_SCRIPT, &command).await?;
        Ok(reply)
    }

    /// A comment's replies in conversation order (oldest first).
    pub async fn list_replies(
        &self,
        conn: &mut ConnectionManager,
        comment_id: &str,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<Reply>, StoreError> {
        let replies = self.replies();
        let index = replies.scoped_index_key(comment_id);
        let page = replies.list_page(conn, &index, offset, limit, false).await?;
        Ok(page.into_iter().filter(|reply| !reply.is_deleted).collect())
    }

    /// Tombstones a comment. The parent post's counter is left as is so
    /// thread sizes stay stable for readers who already saw them.
    pub async fn soft_delete_comment(&self, conn: &mut ConnectionManager, comment_id: &str) -> Result<(), StoreError> {
        let comments = self.comments();
        comments.fetch(conn, comment_id).await?;
        comments.set_path(conn, comment_id, "$.is_deleted", &true).await
    }

    /// Tombstones a reply; the parent comment's counter is left as is.
    pub async fn soft_delete_reply(&self, conn: &mut ConnectionManager, reply_id: &str) -> Result<(), StoreError> {
        let replies = self.replies();
        replies.fetch(conn, reply_id).await?;
        replies.set_path(conn, reply_id, "$.is_deleted", &true).await
    }
}
