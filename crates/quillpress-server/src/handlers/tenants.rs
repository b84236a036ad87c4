//! Tenant administration endpoints, gated by the super-admin key.

use axum::Json;
use axum::extract::{Path, Query, State};
use quillpress_auth::TokenSigner;
use quillpress_auth::token::generate_tenant_secret;
use quillpress_core::models::tenant::{CreateTenant, PasswordPolicy, UpdateTenant};
use quillpress_core::repository::TenantRepository;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::handlers::{Page, PageQuery, TenantView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub domain: String,
    pub token_lifetime_secs: Option<u64>,
    pub allow_registration: Option<bool>,
    pub allow_oauth: Option<bool>,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub password_policy: Option<PasswordPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub domain: Option<String>,
    pub token_lifetime_secs: Option<u64>,
    pub allow_registration: Option<bool>,
    pub allow_oauth: Option<bool>,
    pub oauth_client_id: Option<Option<String>>,
    pub oauth_client_secret: Option<Option<String>>,
    pub password_policy: Option<PasswordPolicy>,
    pub active: Option<bool>,
}

pub async fn create_tenant(
    State(state): State<AppState>,
    Json(body): Json<CreateTenantRequest>,
) -> ApiResult<Json<TenantView>> {
    // A per-tenant signing secret only exists in HMAC deployments; under
    // the service-wide keypair the tenant claim is the boundary.
    let token_secret = match state.signer.as_ref() {
        TokenSigner::Hmac => Some(generate_tenant_secret()),
        TokenSigner::Rsa { .. } => None,
    };

    let tenant = state
        .tenants
        .create(CreateTenant {
            name: body.name,
            domain: body.domain,
            token_secret,
            token_lifetime_secs: body
                .token_lifetime_secs
                .unwrap_or(state.default_token_lifetime_secs),
            allow_registration: body.allow_registration.unwrap_or(true),
            allow_oauth: body.allow_oauth.unwrap_or(false),
            oauth_client_id: body.oauth_client_id,
            oauth_client_secret: body.oauth_client_secret,
            password_policy: body.password_policy.unwrap_or_default(),
        })
        .await?;

    Ok(Json(tenant.into()))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TenantView>> {
    let tenant = state.tenants.get_by_id(id).await?;
    Ok(Json(tenant.into()))
}

pub async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTenantRequest>,
) -> ApiResult<Json<TenantView>> {
    let tenant = state
        .tenants
        .update(
            id,
            UpdateTenant {
                domain: body.domain,
                token_lifetime_secs: body.token_lifetime_secs,
                allow_registration: body.allow_registration,
                allow_oauth: body.allow_oauth,
                oauth_client_id: body.oauth_client_id,
                oauth_client_secret: body.oauth_client_secret,
                password_policy: body.password_policy,
                active: body.active,
            },
        )
        .await?;

    Ok(Json(tenant.into()))
}

pub async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<TenantView>>> {
    let result = state.tenants.list(query.into_pagination()).await?;
    Ok(Page::map(result, TenantView::from))
}
