//! Identity resolution and privilege gates.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use quillpress_auth::identity::{self, IdentityResolver, Principal};
use quillpress_core::error::CoreError;
use quillpress_core::models::tenant::Tenant;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

pub const SUPER_ADMIN_KEY_HEADER: &str = "x-super-admin-key";
pub const INTERNAL_REQUEST_HEADER: &str = "x-internal-request";

fn tenant_from_extensions(request: &Request) -> Result<Tenant, ApiError> {
    request.extensions().get::<Tenant>().cloned().ok_or_else(|| {
        ApiError(CoreError::Internal(
            "identity middleware requires tenant resolution first".into(),
        ))
    })
}

/// Required authentication: trusted upstream headers, else bearer token.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let tenant = match tenant_from_extensions(&request) {
        Ok(tenant) => tenant,
        Err(error) => return error.into_response(),
    };

    let resolver = IdentityResolver::new(&state.signer);
    match resolver.authenticate(&tenant, request.headers()) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(error) => ApiError(error).into_response(),
    }
}

/// Optional authentication: anonymous callers pass through, but a
/// present-and-invalid credential still fails.
pub async fn authenticate_optional(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let tenant = match tenant_from_extensions(&request) {
        Ok(tenant) => tenant,
        Err(error) => return error.into_response(),
    };

    let resolver = IdentityResolver::new(&state.signer);
    match resolver.authenticate_optional(&tenant, request.headers()) {
        Ok(principal) => {
            request.extensions_mut().insert(OptionalAuth(principal));
            next.run(request).await
        }
        Err(error) => ApiError(error).into_response(),
    }
}

/// Role gate for admin route groups; layered after [`authenticate`].
pub async fn require_admin(request: Request, next: Next) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return ApiError(CoreError::Unauthenticated {
            reason: "no credential present".into(),
        })
        .into_response();
    };

    match identity::require_admin(principal) {
        Ok(()) => next.run(request).await,
        Err(error) => ApiError(error).into_response(),
    }
}

/// Gate for endpoints reachable only from inside the cluster; an edge
/// proxy strips this marker from external traffic.
pub async fn require_internal(request: Request, next: Next) -> Response {
    let is_internal = request
        .headers()
        .get(INTERNAL_REQUEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "true");

    if is_internal {
        next.run(request).await
    } else {
        ApiError(CoreError::Forbidden {
            reason: "internal endpoint".into(),
        })
        .into_response()
    }
}

/// Gate for tenant-administration endpoints: the process-wide
/// super-admin key, compared in constant time.
pub async fn require_super_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(SUPER_ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let matches: bool = presented
        .as_bytes()
        .ct_eq(state.super_admin_key.as_bytes())
        .into();

    if matches {
        next.run(request).await
    } else {
        ApiError(CoreError::Forbidden {
            reason: "super admin key required".into(),
        })
        .into_response()
    }
}

/// Extractor for the authenticated principal.
#[derive(Debug, Clone)]
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| {
                ApiError(CoreError::Unauthenticated {
                    reason: "no credential present".into(),
                })
            })
    }
}

/// Extractor for the optionally authenticated principal.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<OptionalAuth>()
            .cloned()
            .unwrap_or(OptionalAuth(None)))
    }
}
