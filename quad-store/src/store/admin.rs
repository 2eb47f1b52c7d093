//! Back-office operations: verification, user management, categories, stats.

use chrono::{Duration, Utc};
use redis::{aio::ConnectionManager, cmd};
use serde::{Deserialize, Serialize};

use crate::{
    errors::StoreError,
    models::{Category, College, NewCategory, Role, User},
    store::Store,
};

/// Window used for the active-user count.
const ACTIVE_WINDOW_HOURS: i64 = 24;

/// Full administrative view of a user, including fields hidden from the
/// public profile.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserView {
    pub id: String,
    pub username: String,
    pub recovery_email: String,
    pub role: Role,
    pub karma_points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub college: Option<College>,
    pub is_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub created_at_ms: i64,
    pub last_active_ms: i64,
}

impl AdminUserView {
    fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            recovery_email: user.recovery_email,
            role: user.role,
            karma_points: user.karma_points,
            college: user.college,
            is_verified: user.is_verified,
            verified_by: user.verified_by,
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at_ms: user.created_at.timestamp_millis(),
            last_active_ms: user.last_active.timestamp_millis(),
        }
    }
}

/// Partial update applied by admins; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub karma_points: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub total_groups: u64,
    /// Users active within the last 24 hours.
    pub active_users: u64,
}

impl Store {
    /// Grants or revokes a user's verified badge, stamping who did it and
    /// when. Fields are written in place so concurrent follow-counter
    /// mutations on the same document survive.
    pub async fn set_verification(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
        verify: bool,
        admin_username: &str,
    ) -> Result<User, StoreError> {
        let users = self.users();
        let mut user = self.fetch_user_by_username(conn, username).await?;
        if verify {
            let now = Utc::now();
            user.is_verified = true;
            user.verified_at = Some(now);
            user.verified_by = Some(admin_username.to_string());
            users.set_path(conn, &user.id, "$.is_verified", &true).await?;
            users
                .set_path(conn, &user.id, "$.verified_at", &now.timestamp_millis())
                .await?;
            users.set_path(conn, &user.id, "$.verified_by", admin_username).await?;
        } else {
            user.is_verified = false;
            user.verified_at = None;
            user.verified_by = None;
            users.set_path(conn, &user.id, "$.is_verified", &false).await?;
            users.del_path(conn, &user.id, "$.verified_at").await?;
            users.del_path(conn, &user.id, "$.verified_by").await?;
        }
        Ok(user)
    }

    /// Pages users newest-registration first.
    pub async fn list_users(
        &self,
        conn: &mut ConnectionManager,
        offset: isize,
        limit: isize,
    ) -> Result<Vec<AdminUserView>, StoreError> {
        let users = self.users();
        let index = users.created_index_key();
        let page = users.list_page(conn, &index, offset, limit, true).await?;
        Ok(page.into_iter().map(AdminUserView::from_user).collect())
    }

    /// Applies an admin edit to role and karma.
    pub async fn update_user(
        &self,
        conn: &mut ConnectionManager,
        username: &str,
        update: AdminUserUpdate,
    ) -> Result<AdminUserView, StoreError> {
        let users = self.users();
        let mut user = self.fetch_user_by_username(conn, username).await?;
        if let Some(role) = update.role {
            user.role = role;
            users.set_path(conn, &user.id, "$.role", &role).await?;
        }
        if let Some(karma) = update.karma_points {
            user.karma_points = karma;
            users.set_path(conn, &user.id, "$.karma_points", &karma).await?;
        }
        Ok(AdminUserView::from_user(user))
    }

    /// Aggregate counters for the back-office dashboard.
    pub async fn stats(&self, conn: &mut ConnectionManager) -> Result<AdminStats, StoreError> {
        let total_users = self.users().count(conn).await?;
        let total_posts = self.posts().count(conn).await?;
        let total_groups = self.groups().count(conn).await?;

        let active_index = self.key_context().named_index("users", "by_active");
        let since = (Utc::now() - Duration::hours(ACTIVE_WINDOW_HOURS)).timestamp_millis();
        let active_users: u64 = cmd("ZCOUNT")
            .arg(&active_index)
            .arg(since)
            .arg("+inf")
            .query_async(conn)
            .await?;

        Ok(AdminStats {
            total_users,
            total_posts,
            total_groups,
            active_users,
        })
    }

    /// Creates a category; names are unique case-insensitively.
    pub async fn create_category(
        &self,
        conn: &mut ConnectionManager,
        submission: NewCategory,
    ) -> Result<Category, StoreError> {
        submission.validate()?;
        let category = submission.into_category(Utc::now());
        self.categories()
            .create(conn, &category, &[("name", &category.name)], &[])
            .await?;
        Ok(category)
    }

    pub async fn list_categories(&self, conn: &mut ConnectionManager) -> Result<Vec<Category>, StoreError> {
        let categories = self.categories();
        let index = categories.created_index_key();
        categories.list_page(conn, &index, 0, 0, false).await
    }

    /// Deletes a category and frees its name for reuse.
    pub async fn delete_category(&self, conn: &mut ConnectionManager, category_id: &str) -> Result<bool, StoreError> {
        let categories = self.categories();
        match categories.get(conn, category_id).await? {
            Some(category) => {
                categories
                    .delete(conn, category_id, &[("name", &category.name)], &[])
                    .await
            }
            None => Ok(false),
        }
    }
}
