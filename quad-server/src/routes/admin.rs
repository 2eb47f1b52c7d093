//! Back-office handlers, gated by the admin role.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use quad_store::models::{Category, NewCategory};
use quad_store::store::admin::{AdminStats, AdminUserUpdate, AdminUserView};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{auth::AdminSession, error::ApiError, routes::PageQuery, state::AppState};

pub async fn stats(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
) -> Result<Json<AdminStats>, ApiError> {
    let mut conn = state.redis.clone();
    Ok(Json(state.store.stats(&mut conn).await?))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<AdminUserView>>, ApiError> {
    let mut conn = state.redis.clone();
    let users = state.store.list_users(&mut conn, page.offset(), page.limit()).await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub username: String,
    #[serde(flatten)]
    pub update: AdminUserUpdate,
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AdminSession(claims): AdminSession,
    Json(request): Json<UserUpdateRequest>,
) -> Result<Json<AdminUserView>, ApiError> {
    let mut conn = state.redis.clone();
    let updated = state
        .store
        .update_user(&mut conn, &request.username, request.update)
        .await?;
    info!(admin = %claims.username, user = %request.username, "admin user update");
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub username: String,
    pub verified: bool,
}

pub async fn set_verification(
    State(state): State<Arc<AppState>>,
    AdminSession(claims): AdminSession,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let user = state
        .store
        .set_verification(&mut conn, &request.username, request.verified, &claims.username)
        .await?;
    info!(admin = %claims.username, user = %request.username, verified = request.verified, "verification change");
    Ok(Json(json!({
        "username": user.username,
        "is_verified": user.is_verified,
        "verified_by": user.verified_by,
    })))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
) -> Result<Json<Vec<Category>>, ApiError> {
    let mut conn = state.redis.clone();
    Ok(Json(state.store.list_categories(&mut conn).await?))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    AdminSession(_claims): AdminSession,
    Json(submission): Json<NewCategory>,
) -> Result<Json<Category>, ApiError> {
    let mut conn = state.redis.clone();
    Ok(Json(state.store.create_category(&mut conn, submission).await?))
}

pub async fn remove_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
    AdminSession(_claims): AdminSession,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let deleted = state.store.delete_category(&mut conn, &category_id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// Hard delete, unlike the owner-facing soft delete.
pub async fn remove_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    AdminSession(claims): AdminSession,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let deleted = state.store.hard_delete_post(&mut conn, &post_id).await?;
    info!(admin = %claims.username, post = %post_id, "post hard deleted");
    Ok(Json(json!({ "deleted": deleted })))
}
