//! User directory: registration, lookup, availability, search, suggestions.

use chrono::Utc;
use redis::{aio::ConnectionManager, cmd};
use serde::Serialize;

use crate::{
    errors::{StoreError, ValidationError},
    id::random_digits,
    models::{AvatarType, College, NewUser, User},
    store::Store,
    validators::is_valid_username,
};

/// How many recent users a directory scan considers before filtering.
const MAX_DIRECTORY_SCAN: isize = 500;

/// Result of a username availability probe.
#[derive(Debug, Clone, Serialize)]
pub struct UsernameCheck {
    pub available: bool,
    pub suggestions: Vec<String>,
}

/// Public slice of a user document, used by search and suggestion responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub avatar_url: String,
    pub avatar_type: AvatarType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<College>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_same_college: Option<bool>,
}

impl UserSummary {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
            avatar_type: user.avatar_type,
            college: user.college.clone(),
            is_verified: user.is_verified,
            is_same_college: None,
        }
    }
}

/// Public profile: the user's directory entry plus their recent posts.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: UserSummary,
    pub followers_count: i64,
    pub following_count: i64,
    pub karma_points: i64,
    pub posts: Vec<crate::models::Post>,
}

/// Derives the variant set offered when a username is taken. Digit suffixes
/// are random per call; the caller filters out collisions afterwards.
pub fn suggestion_candidates(base: &str) -> Vec<String> {
    vec![
        format!("{base}{}", random_digits(3)),
        format!("{base}_{}", random_digits(2)),
        format!("the_{base}"),
        format!("{base}_pro"),
        format!("anonymous_{base}"),
    ]
}

impl Store {
    /// Registers a user. The unique username constraint is enforced in the
    /// same script that writes the document.
    pub async fn create_user(&self, conn: &mut ConnectionManager, submission: NewUser) -> Result<User, StoreError> {
        submission.validate()?;
        let user = submission.into_user(Utc::now());
        let active_index = self.key_context().named_index("users", "by_active");
        self.users()
            .create(conn, &user, &[("username", &user.username)], &[active_index])
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_username(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        self.users().find_by_unique(conn, "username", username).await
    }

    pub async fn fetch_user_by_username(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
    ) -> Result<User, StoreError> {
        self.find_user_by_username(conn, username)
            .await?
            .ok_or_else(|| StoreError::not_found(username))
    }

    /// Availability probe plus collision-filtered suggestions when taken.
    /// There is no uniqueness guarantee across concurrent registrations;
    /// the create path still enforces the constraint atomically.
    pub async fn check_username(
        &self,
        conn: &mut ConnectionManager,
        candidate: &str,
    ) -> Result<UsernameCheck, StoreError> {
        if !is_valid_username(candidate) {
            return Err(ValidationError::single(
                "username",
                "validation.username",
                "username must be 3-20 characters: letters, digits, underscores",
            )
            .into());
        }

        let users = self.users();
        if users.find_id_by_unique(conn, "username", candidate).await?.is_none() {
            return Ok(UsernameCheck {
                available: true,
                suggestions: Vec::new(),
            });
        }

        let mut suggestions = Vec::new();
        for suggestion in suggestion_candidates(candidate) {
            if is_valid_username(&suggestion)
                && users.find_id_by_unique(conn, "username", &suggestion).await?.is_none()
            {
                suggestions.push(suggestion);
            }
        }
        Ok(UsernameCheck {
            available: false,
            suggestions,
        })
    }

    /// Refreshes `last_active` and the activity index entry. The timestamp
    /// is written in place so follow-counter increments landing between the
    /// existence check and the write are never overwritten.
    pub async fn touch_last_active(&self, conn: &mut ConnectionManager, user_id: &str) -> Result<(), StoreError> {
        let users = self.users();
        users.fetch(conn, user_id).await?;
        let now_ms = Utc::now().timestamp_millis();
        users.set_path(conn, user_id, "$.last_active", &now_ms).await?;
        let active_index = self.key_context().named_index("users", "by_active");
        let _: () = cmd("ZADD")
            .arg(&active_index)
            .arg(now_ms)
            .arg(user_id)
            .query_async(conn)
            .await?;
        Ok(())
    }

    /// Case-insensitive match on username, college name, and college location;
    /// username matches rank first, then college matches.
    pub async fn search_users(
        &self,
        conn: &mut ConnectionManager,
        query: &str,
        limit: usize,
    ) -> Result<Vec<UserSummary>, StoreError> {
        let needle = query.trim().to_lowercase();
        if needle.len() < 2 {
            return Ok(Vec::new());
        }

        let users = self.users();
        let index = users.created_index_key();
        let candidates = users.list_page(conn, &index, 0, MAX_DIRECTORY_SCAN, true).await?;

        let mut matched: Vec<(&User, bool, bool)> = candidates
            .iter()
            .filter_map(|user| {
                let username_hit = user.username.to_lowercase().contains(&needle);
                let college_hit = user.college.as_ref().is_some_and(|college| {
                    college.name.to_lowercase().contains(&needle)
                        || college.location.to_lowercase().contains(&needle)
                });
                (username_hit || college_hit).then_some((user, username_hit, college_hit))
            })
            .collect();

        matched.sort_by_key(|(_, username_hit, college_hit)| (!username_hit, !college_hit));
        Ok(matched
            .into_iter()
            .take(limit)
            .map(|(user, _, _)| UserSummary::from_user(user))
            .collect())
    }

    /// Public profile joined with the user's recent posts.
    pub async fn user_profile(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
        post_limit: isize,
    ) -> Result<UserProfile, StoreError> {
        let user = self.fetch_user_by_username(conn, username).await?;
        let posts = self.posts_by_user(conn, &user.id, 0, post_limit).await?;
        Ok(UserProfile {
            followers_count: user.followers_count,
            following_count: user.following_count,
            karma_points: user.karma_points,
            user: UserSummary::from_user(&user),
            posts,
        })
    }

    /// People-to-follow suggestions: recent users excluding the requester,
    /// same-college first, then verified, then newest.
    pub async fn follow_suggestions(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
        limit: usize,
    ) -> Result<Vec<UserSummary>, StoreError> {
        let current = self.fetch_user_by_username(conn, username).await?;
        let current_college = current.college.as_ref().map(|college| college.id.clone());

        let users = self.users();
        let index = users.created_index_key();
        let candidates = users.list_page(conn, &index, 0, MAX_DIRECTORY_SCAN, true).await?;

        let mut suggestions: Vec<(User, bool)> = candidates
            .into_iter()
            .filter(|user| user.id != current.id)
            .map(|user| {
                let same_college = match (&current_college, &user.college) {
                    (Some(mine), Some(theirs)) => *mine == theirs.id,
                    _ => false,
                };
                (user, same_college)
            })
            .collect();

        suggestions.sort_by_key(|(user, same_college)| {
            (!*same_college, !user.is_verified, -user.created_at.timestamp_millis())
        });

        Ok(suggestions
            .into_iter()
            .take(limit)
            .map(|(user, same_college)| {
                let mut summary = UserSummary::from_user(&user);
                summary.is_same_college = Some(same_college);
                summary
            })
            .collect())
    }
}
