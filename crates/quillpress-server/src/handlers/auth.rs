//! Authentication endpoints.

use axum::Json;
use axum::extract::State;
use quillpress_core::repository::UserRepository;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::handlers::UserView;
use crate::middleware::{Auth, CurrentTenant};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthLoginRequest {
    /// Subject id at the external OAuth provider.
    pub subject: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let output = state
        .auth
        .register(&tenant, &body.email, &body.password)
        .await?;
    Ok(Json(AuthResponse {
        token: output.token,
        user: output.user.into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let output = state.auth.login(&tenant, &body.email, &body.password).await?;
    Ok(Json(AuthResponse {
        token: output.token,
        user: output.user.into(),
    }))
}

pub async fn oauth_login(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<OAuthLoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let output = state
        .auth
        .oauth_login(&tenant, &body.subject, &body.email)
        .await?;
    Ok(Json(AuthResponse {
        token: output.token,
        user: output.user.into(),
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = state.auth.refresh(&tenant, &body.token).await?;
    Ok(Json(RefreshResponse { token }))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Auth(principal): Auth,
) -> ApiResult<Json<UserView>> {
    let user = state.users.get_by_id(tenant.id, principal.user_id).await?;
    Ok(Json(user.into()))
}
