use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use chirpy_auth::{extract_bearer_token, issue_token, validate_token, AuthError};
use chirpy_sdk::{clean_chirp, Post, PostId, Repository, User, UserId};

use crate::error::ServerResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: UserId,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Readiness probe.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        "OK",
    )
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ServerResult<(StatusCode, Json<User>)> {
    let user = state
        .with_repo(move |repo| repo.register_user(&req.email, &req.password))
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    let lifetime = state.config.token_lifetime_secs(req.expires_in_seconds);
    let LoginRequest {
        email, password, ..
    } = req;
    let user = state
        .with_repo(move |repo| repo.authenticate_user(&email, &password))
        .await?;

    let token = issue_token(user.id, state.jwt_secret(), Duration::from_secs(lifetime))?;
    debug!(user_id = user.id, lifetime, "issued token");
    Ok(Json(LoginResponse {
        id: user.id,
        email: user.email,
        token,
    }))
}

pub async fn create_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateChirpRequest>,
) -> ServerResult<(StatusCode, Json<Post>)> {
    let user_id = authenticated_user(&state, &headers)?;

    Repository::validate_post_body(&req.body)?;
    let body = clean_chirp(&req.body);
    let post = state.with_repo(move |repo| repo.create_post(&body)).await?;

    debug!(user_id, post_id = post.id, "chirp created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_chirps(State(state): State<AppState>) -> ServerResult<Json<Vec<Post>>> {
    let posts = state.with_repo(|repo| repo.list_posts()).await?;
    Ok(Json(posts))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> ServerResult<Json<Post>> {
    let post = state.with_repo(move |repo| repo.get_post(id)).await?;
    Ok(Json(post))
}

fn authenticated_user(state: &AppState, headers: &HeaderMap) -> ServerResult<UserId> {
    let value = match headers.get(AUTHORIZATION) {
        Some(v) => v.to_str().map_err(|_| AuthError::MalformedHeader)?,
        None => "",
    };
    let token = extract_bearer_token(value)?;
    Ok(validate_token(token, state.jwt_secret())?)
}
