//! Group handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use quad_store::models::{Group, NewGroup};
use quad_store::store::groups::GroupsOverview;
use serde_json::{Value, json};

use crate::{auth::AuthSession, error::ApiError, state::AppState};

pub async fn overview(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
) -> Result<Json<GroupsOverview>, ApiError> {
    let mut conn = state.redis.clone();
    let overview = state.store.groups_overview(&mut conn, &claims.username).await?;
    Ok(Json(overview))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(mut submission): Json<NewGroup>,
) -> Result<Json<Group>, ApiError> {
    submission.username = claims.username;
    let mut conn = state.redis.clone();
    let group = state.store.create_group(&mut conn, submission).await?;
    Ok(Json(group))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let mut conn = state.redis.clone();
    Ok(Json(state.store.get_group(&mut conn, &group_id).await?))
}

#[derive(Debug, serde::Deserialize)]
pub struct MembershipRequest {
    pub group_id: String,
}

pub async fn join(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(request): Json<MembershipRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let member_count = state
        .store
        .join_group(&mut conn, &request.group_id, &claims.username)
        .await?;
    Ok(Json(json!({ "member_count": member_count, "joined": true })))
}

pub async fn leave(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(request): Json<MembershipRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let member_count = state
        .store
        .leave_group(&mut conn, &request.group_id, &claims.username)
        .await?;
    Ok(Json(json!({ "member_count": member_count, "joined": false })))
}
