//! Route table and middleware composition.
//!
//! Routes are grouped by their gate chain. Layers run outermost-first,
//! so each group lists its gates innermost-first: the tenant layer added
//! last runs before identity, which runs before role gates.

use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{identity, tenancy};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    // Tenant administration: super-admin key only, no tenant context.
    let super_admin = Router::new()
        .route(
            "/api/tenants",
            post(handlers::tenants::create_tenant).get(handlers::tenants::list_tenants),
        )
        .route(
            "/api/tenants/{id}",
            get(handlers::tenants::get_tenant).patch(handlers::tenants::update_tenant),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity::require_super_admin,
        ));

    // Tenant-scoped surface with optional identity. Anonymous callers
    // pass through; identity only widens behavior (draft visibility,
    // user-keyed dedup) — the mutating post handlers gate on the admin
    // role themselves because the collection shares these paths.
    let tenant_public = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/oauth", post(handlers::auth::oauth_login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route(
            "/api/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route("/api/posts/featured", get(handlers::posts::featured_post))
        .route(
            "/api/posts/{id}",
            get(handlers::posts::get_post).delete(handlers::posts::delete_post),
        )
        .route("/api/posts/{id}/view", post(handlers::posts::record_view))
        .route("/api/posts/{id}/like", post(handlers::posts::toggle_like))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity::authenticate_optional,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenancy::resolve_tenant,
        ));

    // Authenticated surface.
    let tenant_authed = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity::authenticate,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenancy::resolve_tenant,
        ));

    // Admin surface: tenant → identity → role gate.
    let tenant_admin = Router::new()
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/{id}/role", patch(handlers::users::change_role))
        .route(
            "/api/users/{id}/status",
            patch(handlers::users::change_status),
        )
        .route("/api/users/{id}", delete(handlers::users::delete_user))
        .route("/api/admin/stats", get(handlers::stats::tenant_stats))
        .route_layer(middleware::from_fn(identity::require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            identity::authenticate,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenancy::resolve_tenant,
        ));

    // Author widgets degrade gracefully when no tenant resolves.
    let optional_tenant = Router::new()
        .route("/api/users/{id}/public", get(handlers::users::public_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenancy::resolve_tenant_optional,
        ));

    // Cluster-internal surface: marker header plus tenant context.
    let internal = Router::new()
        .route(
            "/api/internal/users/lookup",
            post(handlers::users::internal_lookup),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenancy::resolve_tenant,
        ))
        .route_layer(middleware::from_fn(identity::require_internal));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/.well-known/jwks.json", get(handlers::jwks::jwks))
        .merge(super_admin)
        .merge(tenant_public)
        .merge(tenant_authed)
        .merge(tenant_admin)
        .merge(optional_tenant)
        .merge(internal)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
