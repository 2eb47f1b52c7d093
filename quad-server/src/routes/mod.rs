//! HTTP surface. Handlers stay thin: decode, authorize, call the store.

pub mod admin;
pub mod auth;
pub mod groups;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::state::AppState;

const DEFAULT_PAGE_SIZE: isize = 20;
const MAX_PAGE_SIZE: isize = 100;

/// Common `?offset=&limit=` paging parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub offset: Option<isize>,
    #[serde(default)]
    pub limit: Option<isize>,
}

impl PageQuery {
    pub fn offset(&self) -> isize {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> isize {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/check-username", get(auth::check_username))
        .route("/api/posts", get(posts::feed).post(posts::create))
        .route("/api/posts/like", post(posts::like_toggle))
        .route("/api/posts/unlike", post(posts::unlike))
        .route(
            "/api/posts/{post_id}",
            get(posts::show).put(posts::edit).delete(posts::remove),
        )
        .route("/api/posts/{post_id}/like", get(posts::like_status))
        .route("/api/posts/{post_id}/vote", post(posts::vote))
        .route(
            "/api/posts/{post_id}/comments",
            get(posts::list_comments).post(posts::create_comment),
        )
        .route("/api/comments/{comment_id}", delete(posts::remove_comment))
        .route(
            "/api/comments/{comment_id}/replies",
            get(posts::list_replies).post(posts::create_reply),
        )
        .route("/api/replies/{reply_id}", delete(posts::remove_reply))
        .route(
            "/api/users/follow",
            get(users::follow_status).post(users::follow_toggle),
        )
        .route("/api/users/search", get(users::search))
        .route("/api/users/suggestions", get(users::suggestions))
        .route("/api/users/profile/{username}", get(users::profile))
        .route("/api/groups", get(groups::overview).post(groups::create))
        .route("/api/groups/join", post(groups::join))
        .route("/api/groups/leave", post(groups::leave))
        .route("/api/groups/{group_id}", get(groups::show))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/users", get(admin::list_users).put(admin::update_user))
        .route("/api/admin/users/verify", post(admin::set_verification))
        .route("/api/admin/categories", get(admin::list_categories).post(admin::create_category))
        .route("/api/admin/categories/{category_id}", delete(admin::remove_category))
        .route("/api/admin/posts/{post_id}", delete(admin::remove_post))
}
