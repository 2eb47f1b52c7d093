//! Feed, engagement, and thread handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use quad_store::models::{NewComment, NewPost, NewReply, Poll, Post, Role};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    auth::AuthSession,
    error::ApiError,
    routes::PageQuery,
    state::AppState,
};

pub async fn feed(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let posts = state.store.list_feed(&mut conn, page.offset(), page.limit()).await?;
    Ok(Json(json!({ "posts": posts })))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(mut submission): Json<NewPost>,
) -> Result<Json<Post>, ApiError> {
    // The author is always the session user, whatever the body says.
    submission.username = claims.username;
    let mut conn = state.redis.clone();
    let post = state.store.create_post(&mut conn, submission).await?;
    Ok(Json(post))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let mut conn = state.redis.clone();
    Ok(Json(state.store.get_post(&mut conn, &post_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub content: String,
}

fn require_author(author_id: &str, claims: &crate::auth::Claims) -> Result<(), ApiError> {
    if claims.user_id != author_id && claims.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    AuthSession(claims): AuthSession,
    Json(request): Json<EditRequest>,
) -> Result<Json<Post>, ApiError> {
    let mut conn = state.redis.clone();
    let post = state.store.get_post(&mut conn, &post_id).await?;
    require_author(&post.author_id, &claims)?;
    let updated = state
        .store
        .update_post_content(&mut conn, &post_id, request.content)
        .await?;
    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let post = state.store.get_post(&mut conn, &post_id).await?;
    require_author(&post.author_id, &claims)?;
    state.store.soft_delete_post(&mut conn, &post_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub post_id: String,
}

pub async fn like_toggle(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(request): Json<LikeRequest>,
) -> Result<Json<quad_store::store::engagement::LikeOutcome>, ApiError> {
    let mut conn = state.redis.clone();
    let outcome = state
        .store
        .toggle_like(&mut conn, &request.post_id, &claims.username)
        .await?;
    Ok(Json(outcome))
}

pub async fn unlike(
    State(state): State<Arc<AppState>>,
    AuthSession(claims): AuthSession,
    Json(request): Json<LikeRequest>,
) -> Result<Json<quad_store::store::engagement::LikeOutcome>, ApiError> {
    let mut conn = state.redis.clone();
    let outcome = state
        .store
        .unlike(&mut conn, &request.post_id, &claims.username)
        .await?;
    Ok(Json(outcome))
}

pub async fn like_status(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let liked = state.store.has_liked(&mut conn, &post_id, &claims.username).await?;
    Ok(Json(json!({ "liked": liked })))
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_index: usize,
}

pub async fn vote(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    AuthSession(claims): AuthSession,
    Json(request): Json<VoteRequest>,
) -> Result<Json<Poll>, ApiError> {
    let mut conn = state.redis.clone();
    let poll = state
        .store
        .vote_poll(&mut conn, &post_id, &claims.username, request.option_index)
        .await?;
    Ok(Json(poll))
}

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let comments = state
        .store
        .list_comments(&mut conn, &post_id, page.offset(), page.limit())
        .await?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    AuthSession(claims): AuthSession,
    Json(mut submission): Json<NewComment>,
) -> Result<Json<quad_store::models::Comment>, ApiError> {
    submission.username = claims.username;
    let mut conn = state.redis.clone();
    let comment = state.store.create_comment(&mut conn, &post_id, submission).await?;
    Ok(Json(comment))
}

pub async fn remove_comment(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<String>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let comment = state.store.comments().fetch(&mut conn, &comment_id).await?;
    require_author(&comment.author_id, &claims)?;
    state.store.soft_delete_comment(&mut conn, &comment_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

pub async fn list_replies(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let replies = state
        .store
        .list_replies(&mut conn, &comment_id, page.offset(), page.limit())
        .await?;
    Ok(Json(json!({ "replies": replies })))
}

pub async fn create_reply(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<String>,
    AuthSession(claims): AuthSession,
    Json(mut submission): Json<NewReply>,
) -> Result<Json<quad_store::models::Reply>, ApiError> {
    submission.username = claims.username;
    let mut conn = state.redis.clone();
    let reply = state.store.create_reply(&mut conn, &comment_id, submission).await?;
    Ok(Json(reply))
}

pub async fn remove_reply(
    State(state): State<Arc<AppState>>,
    Path(reply_id): Path<String>,
    AuthSession(claims): AuthSession,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.redis.clone();
    let reply = state.store.replies().fetch(&mut conn, &reply_id).await?;
    require_author(&reply.author_id, &claims)?;
    state.store.soft_delete_reply(&mut conn, &reply_id).await?;
    Ok(Json(json!({ "deleted": true })))
}
