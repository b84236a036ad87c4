//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation. Operations
//! documented as atomic must apply their record and counter mutations in
//! one transaction; callers rely on never observing the two disagree.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{
    engagement::EngagementOutcome,
    post::{CreatePost, Post, PostEngagementSnapshot},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenants (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Tenant>> + Send;
    /// `name` is globally unique and doubles as the subdomain label.
    fn get_by_name(&self, name: &str) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Users (tenant scope)
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_email(
        &self,
        tenant_id: Uuid,
        email: &str,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_oauth_subject(
        &self,
        tenant_id: Uuid,
        subject: &str,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_many(
        &self,
        tenant_id: Uuid,
        ids: &[Uuid],
    ) -> impl Future<Output = CoreResult<Vec<User>>> + Send;
    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    /// Soft-delete: sets status to Deleted. Admin-protection is enforced
    /// by the calling service, not here.
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<User>>> + Send;
    /// Number of users created in `[from, to)`, for stats fan-out.
    fn count_created_between(
        &self,
        tenant_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Posts (tenant scope)
// ---------------------------------------------------------------------------

pub trait PostRepository: Send + Sync {
    fn create(&self, input: CreatePost) -> impl Future<Output = CoreResult<Post>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreResult<Post>> + Send;
    /// `include_drafts` widens visibility for admin callers.
    fn list(
        &self,
        tenant_id: Uuid,
        include_drafts: bool,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Post>>> + Send;
    fn get_featured(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = CoreResult<Option<Post>>> + Send;
    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn count(&self, tenant_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;

    /// Counters of every published post, for the featured ranker.
    fn engagement_snapshot(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<PostEngagementSnapshot>>> + Send;

    /// Atomically clears the featured flag tenant-wide and sets it on
    /// `post_id`. No interleaving may observe zero or two featured posts.
    fn set_featured_exclusive(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
    ) -> impl Future<Output = CoreResult<()>> + Send;

    /// Clears the featured flag from every post in the tenant.
    fn clear_featured(&self, tenant_id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Engagement (tenant scope)
// ---------------------------------------------------------------------------

pub trait EngagementRepository: Send + Sync {
    /// Records a view for `identity`. A record absent or older than
    /// `stale_before` counts as new: its timestamp is refreshed to now
    /// and the post's view counter increments, atomically.
    fn record_view(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &str,
        stale_before: DateTime<Utc>,
    ) -> impl Future<Output = CoreResult<EngagementOutcome>> + Send;

    /// Toggles a like for `identity`: a live record is removed and the
    /// counter decremented, otherwise a record is created and the counter
    /// incremented — atomically in both directions.
    fn toggle_like(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &str,
    ) -> impl Future<Output = CoreResult<EngagementOutcome>> + Send;
}
