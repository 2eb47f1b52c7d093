//! Directory handlers: profiles, search, suggestions, follows.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use quad_store::store::{
    engagement::{FollowOutcome, FollowStatusView},
    users::{UserProfile, UserSummary},
};
use serde::Deserialize;

use crate::{auth::AuthSession, error::ApiError, routes::PageQuery, state::AppState};

const SEARCH_LIMIT: usize = 20;
const SUGGESTION_LIMIT: usize = 10;
const PROFILE_POST_LIMIT: isize = 20;

pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let mut conn = state.redis.clone();
    let profile = state
        .store
        .user_profile(&mut conn, &username, PROFILE_POST_LIMIT)
        .await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let mut conn = state.redis.clone();
    let results = state.store.search_users(&mut conn, &query.q, SEARCH_LIMIT).await?;
    Ok(Json(results))
}

pub async fn suggestions(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let limit = (page.limit() as usize).min(SUGGESTION_LIMIT);
    let mut conn = state.redis.clone();
    let results = state
        .store
        .follow_suggestions(&mut conn, &claims.username, limit)
        .await?;
    Ok(Json(results))
}

/// Target of a follow toggle or status check.
#[derive(Debug, Deserialize)]
pub struct FollowTarget {
    pub username: String,
}

pub async fn follow_toggle(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(target): Json<FollowTarget>,
) -> Result<Json<FollowOutcome>, ApiError> {
    let mut conn = state.redis.clone();
    let outcome = state
        .store
        .toggle_follow(&mut conn, &claims.username, &target.username)
        .await?;
    Ok(Json(outcome))
}

pub async fn follow_status(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Query(target): Query<FollowTarget>,
) -> Result<Json<FollowStatusView>, ApiError> {
    let mut conn = state.redis.clone();
    let status = state
        .store
        .follow_status(&mut conn, &claims.username, &target.username)
        .await?;
    Ok(Json(status))
}
