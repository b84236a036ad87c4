//! User administration, public author lookup, and internal batch
//! lookup endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use quillpress_core::error::CoreError;
use quillpress_core::models::user::{Role, UserStatus};
use quillpress_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::handlers::{Page, PageQuery, UserView};
use crate::middleware::{Auth, CurrentTenant, MaybeTenant};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: UserStatus,
}

pub async fn list_users(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<UserView>>> {
    let result = state.users.list(tenant.id, query.into_pagination()).await?;
    Ok(Page::map(result, UserView::from))
}

pub async fn change_role(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeRoleRequest>,
) -> ApiResult<Json<UserView>> {
    let user = state.admin.change_role(&principal, id, body.role).await?;
    Ok(Json(user.into()))
}

pub async fn change_status(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeStatusRequest>,
) -> ApiResult<Json<UserView>> {
    let user = state
        .admin
        .change_status(&principal, id, body.status)
        .await?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.admin.delete_user(&principal, id).await?;
    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Public author card for profile widgets.
#[derive(Debug, Serialize)]
pub struct PublicUserView {
    pub id: Uuid,
    pub email: String,
}

/// Author enrichment for collaborator services. Resolved under the
/// optional-tenant layer so a widget on an unrecognized host degrades to
/// a plain 404 instead of failing tenant resolution.
pub async fn public_user(
    State(state): State<AppState>,
    MaybeTenant(tenant): MaybeTenant,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicUserView>> {
    let Some(tenant) = tenant else {
        return Err(CoreError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        }
        .into());
    };

    let user = state.users.get_by_id(tenant.id, id).await?;
    Ok(Json(PublicUserView {
        id: user.id,
        email: user.email,
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchLookupRequest {
    pub ids: Vec<Uuid>,
}

/// Batch lookup for sibling services (comment enrichment). Reachable
/// only with the internal-request marker.
pub async fn internal_lookup(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    Json(body): Json<BatchLookupRequest>,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.users.get_many(tenant.id, &body.ids).await?;
    Ok(Json(users.into_iter().map(UserView::from).collect()))
}
