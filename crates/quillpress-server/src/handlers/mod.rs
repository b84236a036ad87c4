//! HTTP handlers.

pub mod auth;
pub mod jwks;
pub mod posts;
pub mod stats;
pub mod tenants;
pub mod users;

use axum::Json;
use chrono::{DateTime, Utc};
use quillpress_core::models::post::{Post, PostStatus};
use quillpress_core::models::tenant::{PasswordPolicy, Tenant};
use quillpress_core::models::user::{Role, User, UserStatus};
use serde::Serialize;
use uuid::Uuid;

pub async fn health() -> &'static str {
    "OK"
}

/// User representation returned to clients; credentials never leave the
/// server.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            status: user.status,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Tenant representation returned to super-admins; signing material and
/// OAuth client secrets never leave the server.
#[derive(Debug, Serialize)]
pub struct TenantView {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    pub token_lifetime_secs: u64,
    pub allow_registration: bool,
    pub allow_oauth: bool,
    pub password_policy: PasswordPolicy,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tenant> for TenantView {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            domain: tenant.domain,
            token_lifetime_secs: tenant.token_lifetime_secs,
            allow_registration: tenant.allow_registration,
            allow_oauth: tenant.allow_oauth,
            password_policy: tenant.password_policy,
            active: tenant.active,
            created_at: tenant.created_at,
            updated_at: tenant.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub view_count: u64,
    pub like_count: u64,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title,
            slug: post.slug,
            status: post.status,
            view_count: post.view_count,
            like_count: post.like_count,
            featured: post.featured,
            published_at: post.published_at,
            created_at: post.created_at,
        }
    }
}

/// Paginated list envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(
        result: quillpress_core::repository::PaginatedResult<T>,
        f: F,
    ) -> Json<Page<U>> {
        Json(Page {
            items: result.items.into_iter().map(f).collect(),
            total: result.total,
            offset: result.offset,
            limit: result.limit,
        })
    }
}

/// Pagination query parameters.
#[derive(Debug, serde::Deserialize, Default)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn into_pagination(self) -> quillpress_core::repository::Pagination {
        let default = quillpress_core::repository::Pagination::default();
        quillpress_core::repository::Pagination {
            offset: self.offset.unwrap_or(default.offset),
            limit: self.limit.unwrap_or(default.limit).min(200),
        }
    }
}
