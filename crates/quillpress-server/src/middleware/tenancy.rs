//! Tenant resolution middleware.
//!
//! Every tenant-scoped route group runs one of these layers first; the
//! resolved tenant rides in request extensions from there on.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use quillpress_auth::tenancy::{TENANT_ID_HEADER, TENANT_NAME_HEADER};
use quillpress_core::error::{CoreError, CoreResult};
use quillpress_core::models::tenant::Tenant;

use crate::error::ApiError;
use crate::state::AppState;

fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn resolve(state: &AppState, headers: &HeaderMap) -> CoreResult<Tenant> {
    state
        .registry
        .resolve_parts(
            header_value(headers, TENANT_ID_HEADER),
            header_value(headers, TENANT_NAME_HEADER),
            header_value(headers, HOST.as_str()),
        )
        .await
}

/// Required tenant resolution; failures end the request here.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve(&state, request.headers()).await {
        Ok(tenant) => {
            request.extensions_mut().insert(tenant);
            next.run(request).await
        }
        Err(error) => ApiError(error).into_response(),
    }
}

/// Optional variant for endpoints that degrade gracefully without a
/// tenant: every resolution failure is swallowed.
pub async fn resolve_tenant_optional(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let tenant = resolve(&state, request.headers()).await.ok();
    request.extensions_mut().insert(MaybeTenant(tenant));
    next.run(request).await
}

/// Extractor for the resolved tenant.
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Tenant);

impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Tenant>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| {
                ApiError(CoreError::Identification {
                    reason: "tenant not resolved for this route".into(),
                })
            })
    }
}

/// Extractor for the optionally resolved tenant.
#[derive(Debug, Clone)]
pub struct MaybeTenant(pub Option<Tenant>);

impl<S> FromRequestParts<S> for MaybeTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<MaybeTenant>()
            .cloned()
            .unwrap_or(MaybeTenant(None)))
    }
}
