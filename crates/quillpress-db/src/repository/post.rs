//! SurrealDB implementation of [`PostRepository`].
//!
//! The featured-slot swap (clear every flag, set one) runs as a single
//! transaction so no concurrent reader observes zero or two featured
//! posts.

use chrono::{DateTime, Utc};
use quillpress_core::error::CoreResult;
use quillpress_core::models::post::{CreatePost, Post, PostEngagementSnapshot, PostStatus};
use quillpress_core::repository::{PaginatedResult, Pagination, PostRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct PostRow {
    tenant_id: String,
    author_id: String,
    title: String,
    slug: String,
    status: String,
    view_count: u64,
    like_count: u64,
    featured: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct PostRowWithId {
    record_id: String,
    tenant_id: String,
    author_id: String,
    title: String,
    slug: String,
    status: String,
    view_count: u64,
    like_count: u64,
    featured: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Counter projection for the featured ranker.
#[derive(Debug, SurrealValue)]
struct SnapshotRow {
    record_id: String,
    view_count: u64,
    like_count: u64,
    featured: bool,
    published_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<PostStatus, DbError> {
    match s {
        "PUBLISHED" => Ok(PostStatus::Published),
        "DRAFT" => Ok(PostStatus::Draft),
        other => Err(DbError::Migration(format!("unknown post status: {other}"))),
    }
}

fn status_to_string(status: PostStatus) -> &'static str {
    match status {
        PostStatus::Published => "PUBLISHED",
        PostStatus::Draft => "DRAFT",
    }
}

impl PostRow {
    fn into_post(self, id: Uuid) -> Result<Post, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let author_id = Uuid::parse_str(&self.author_id)
            .map_err(|e| DbError::Migration(format!("invalid author UUID: {e}")))?;
        Ok(Post {
            id,
            tenant_id,
            author_id,
            title: self.title,
            slug: self.slug,
            status: parse_status(&self.status)?,
            view_count: self.view_count,
            like_count: self.like_count,
            featured: self.featured,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PostRowWithId {
    fn try_into_post(self) -> Result<Post, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let author_id = Uuid::parse_str(&self.author_id)
            .map_err(|e| DbError::Migration(format!("invalid author UUID: {e}")))?;
        Ok(Post {
            id,
            tenant_id,
            author_id,
            title: self.title,
            slug: self.slug,
            status: parse_status(&self.status)?,
            view_count: self.view_count,
            like_count: self.like_count,
            featured: self.featured,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SnapshotRow {
    fn try_into_snapshot(self) -> Result<PostEngagementSnapshot, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(PostEngagementSnapshot {
            id,
            view_count: self.view_count,
            like_count: self.like_count,
            featured: self.featured,
            published_at: self.published_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Post repository.
#[derive(Clone)]
pub struct SurrealPostRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPostRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PostRepository for SurrealPostRepository<C> {
    async fn create(&self, input: CreatePost) -> CoreResult<Post> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let tenant_id_str = input.tenant_id.to_string();
        let author_id_str = input.author_id.to_string();
        let published_at = match input.status {
            PostStatus::Published => Some(Utc::now()),
            PostStatus::Draft => None,
        };

        let result = self
            .db
            .query(
                "CREATE type::record('post', $id) SET \
                 tenant_id = $tenant_id, \
                 author_id = $author_id, \
                 title = $title, slug = $slug, \
                 status = $status, \
                 view_count = 0, like_count = 0, \
                 featured = false, \
                 published_at = $published_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .bind(("author_id", author_id_str))
            .bind(("title", input.title))
            .bind(("slug", input.slug))
            .bind(("status", status_to_string(input.status).to_string()))
            .bind(("published_at", published_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::from_create(e, "post"))?;

        let rows: Vec<PostRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "post".into(),
            id: id_str,
        })?;

        Ok(row.into_post(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Post> {
        let id_str = id.to_string();
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('post', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PostRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "post".into(),
            id: id_str,
        })?;

        Ok(row.into_post(id)?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        include_drafts: bool,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<Post>> {
        let tenant_id_str = tenant_id.to_string();
        let status_filter = if include_drafts {
            ""
        } else {
            " AND status = 'PUBLISHED'"
        };

        let count_query = format!(
            "SELECT count() AS total FROM post \
             WHERE tenant_id = $tenant_id{status_filter} GROUP ALL"
        );
        let mut count_result = self
            .db
            .query(&count_query)
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM post \
             WHERE tenant_id = $tenant_id{status_filter} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PostRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_post())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn get_featured(&self, tenant_id: Uuid) -> CoreResult<Option<Post>> {
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM post \
                 WHERE tenant_id = $tenant_id AND featured = true \
                 LIMIT 1",
            )
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PostRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_post()?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        let id_str = id.to_string();
        let tenant_id_str = tenant_id.to_string();

        // Remove the post and its engagement records together; a record
        // without its post would permanently block re-engagement.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE type::record('post', $id) WHERE tenant_id = $tenant_id; \
                 DELETE engagement WHERE tenant_id = $tenant_id AND post_id = $id; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str))
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn count(&self, tenant_id: Uuid) -> CoreResult<u64> {
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM post \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn engagement_snapshot(
        &self,
        tenant_id: Uuid,
    ) -> CoreResult<Vec<PostEngagementSnapshot>> {
        let tenant_id_str = tenant_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, view_count, like_count, \
                 featured, published_at FROM post \
                 WHERE tenant_id = $tenant_id AND status = 'PUBLISHED'",
            )
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SnapshotRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_snapshot())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn set_featured_exclusive(&self, tenant_id: Uuid, post_id: Uuid) -> CoreResult<()> {
        let tenant_id_str = tenant_id.to_string();
        let post_id_str = post_id.to_string();

        // Clear-all and set-one as one atomic unit.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 UPDATE post SET featured = false, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND featured = true; \
                 UPDATE type::record('post', $post_id) SET \
                 featured = true, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id; \
                 COMMIT TRANSACTION;",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("post_id", post_id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }

    async fn clear_featured(&self, tenant_id: Uuid) -> CoreResult<()> {
        let tenant_id_str = tenant_id.to_string();

        self.db
            .query(
                "UPDATE post SET featured = false, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id AND featured = true",
            )
            .bind(("tenant_id", tenant_id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        Ok(())
    }
}
