//! Registration and login.
//!
//! There are no passwords: a registration returns a one-time style temp id
//! the client stores, and login proves possession of it.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use quad_store::models::{NewUser, User};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    auth::{Claims, issue_token},
    error::ApiError,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: Value,
}

fn session_response(state: &AppState, user: &User) -> Result<SessionResponse, ApiError> {
    let claims = Claims {
        user_id: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
        exp: Utc::now().timestamp() + state.config.token_ttl_secs,
    };
    let token = issue_token(&claims, &state.config.token_secret)?;
    Ok(SessionResponse {
        token,
        user: json!({
            "id": user.id,
            "username": user.username,
            "avatar_type": user.avatar_type,
            "avatar_url": user.avatar_url,
            "college": user.college,
            "role": user.role,
            "is_verified": user.is_verified,
        }),
    })
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<NewUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let user = state.store.create_user(&mut conn, submission).await?;
    info!(username = %user.username, "user registered");

    let session = session_response(&state, &user)?;
    // The temp id is shown exactly once, at registration.
    Ok(Json(json!({
        "token": session.token,
        "user": session.user,
        "temp_id": user.temp_id,
    })))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub temp_id: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut conn = state.redis.clone();
    let user = state
        .store
        .find_user_by_username(&mut conn, &request.username)
        .await?
        .filter(|user| user.temp_id == request.temp_id)
        .ok_or(ApiError::Unauthorized)?;

    state.store.touch_last_active(&mut conn, &user.id).await?;
    Ok(Json(session_response(&state, &user)?))
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

pub async fn check_username(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<quad_store::store::users::UsernameCheck>, ApiError> {
    let mut conn = state.redis.clone();
    let check = state.store.check_username(&mut conn, &query.username).await?;
    Ok(Json(check))
}
