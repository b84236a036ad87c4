//! Post and engagement endpoints.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::HeaderMap;
use quillpress_core::error::CoreError;
use quillpress_core::models::engagement::EngagementOutcome;
use quillpress_core::models::post::{CreatePost, PostStatus};
use quillpress_core::repository::PostRepository;
use quillpress_engage::identity_for;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quillpress_auth::identity::{self, Principal};

use crate::error::ApiResult;
use crate::handlers::{Page, PageQuery, PostView};
use crate::ip::client_ip;
use crate::middleware::{CurrentTenant, OptionalAuth};
use crate::state::AppState;
use crate::tasks::spawn_best_effort;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub slug: String,
    #[serde(default = "default_status")]
    pub status: PostStatus,
}

fn default_status() -> PostStatus {
    PostStatus::Draft
}

#[derive(Debug, Serialize)]
pub struct EngagementResponse {
    #[serde(rename = "isNewEngagement")]
    pub is_new_engagement: bool,
    #[serde(rename = "currentCount")]
    pub current_count: u64,
}

impl From<EngagementOutcome> for EngagementResponse {
    fn from(outcome: EngagementOutcome) -> Self {
        Self {
            is_new_engagement: outcome.is_new,
            current_count: outcome.current_count,
        }
    }
}

/// Queue a featured recompute for the tenant; counter changes must not
/// block or fail the triggering request.
fn recompute_featured(state: &AppState, tenant_id: Uuid) {
    let ranker = state.ranker.clone();
    spawn_best_effort("featured-recompute", async move {
        ranker.recompute(tenant_id).await
    });
}

/// The post collection shares one route group with optional identity,
/// so the mutating handlers apply the admin gate themselves.
fn require_admin_caller(principal: Option<Principal>) -> Result<Principal, CoreError> {
    let principal = principal.ok_or(CoreError::Unauthenticated {
        reason: "no credential present".into(),
    })?;
    identity::require_admin(&principal)?;
    Ok(principal)
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    OptionalAuth(principal): OptionalAuth,
    Json(body): Json<CreatePostRequest>,
) -> ApiResult<Json<PostView>> {
    let principal = require_admin_caller(principal)?;
    let post = state
        .posts
        .create(CreatePost {
            tenant_id: tenant.id,
            author_id: principal.user_id,
            title: body.title,
            slug: body.slug,
            status: body.status,
        })
        .await?;

    recompute_featured(&state, tenant.id);
    Ok(Json(post.into()))
}

pub async fn list_posts(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    OptionalAuth(principal): OptionalAuth,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<PostView>>> {
    // Anonymous and non-admin callers see published posts only.
    let include_drafts = principal.is_some_and(|p| p.is_admin());
    let result = state
        .posts
        .list(tenant.id, include_drafts, query.into_pagination())
        .await?;
    Ok(Page::map(result, PostView::from))
}

pub async fn get_post(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    OptionalAuth(principal): OptionalAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostView>> {
    let post = state.posts.get_by_id(tenant.id, id).await?;
    if post.status == PostStatus::Draft && !principal.is_some_and(|p| p.is_admin()) {
        return Err(CoreError::NotFound {
            entity: "post".into(),
            id: id.to_string(),
        }
        .into());
    }
    Ok(Json(post.into()))
}

pub async fn delete_post(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    OptionalAuth(principal): OptionalAuth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_admin_caller(principal)?;
    state.posts.delete(tenant.id, id).await?;
    recompute_featured(&state, tenant.id);
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

pub async fn record_view(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    OptionalAuth(principal): OptionalAuth,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<EngagementResponse>> {
    let identity = identity_for(
        principal.map(|p| p.user_id),
        &client_ip(&headers, peer),
    );
    let outcome = state.engagement.record_view(tenant.id, id, &identity).await?;

    if outcome.is_new {
        recompute_featured(&state, tenant.id);
    }
    Ok(Json(outcome.into()))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    OptionalAuth(principal): OptionalAuth,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> ApiResult<Json<EngagementResponse>> {
    let identity = identity_for(
        principal.map(|p| p.user_id),
        &client_ip(&headers, peer),
    );
    let outcome = state.engagement.toggle_like(tenant.id, id, &identity).await?;

    recompute_featured(&state, tenant.id);
    Ok(Json(outcome.into()))
}

pub async fn featured_post(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<Json<Option<PostView>>> {
    let post = state.posts.get_featured(tenant.id).await?;
    Ok(Json(post.map(PostView::from)))
}
