//! SurrealDB implementation of [`EngagementRepository`].
//!
//! Every operation runs the dedup-record mutation and the post-counter
//! mutation inside one transaction. The invariant: the counter on a post
//! always equals the number of live records that are due; concurrent
//! toggles from the same identity must not leave the counter skewed.

use chrono::{DateTime, Utc};
use quillpress_core::error::CoreResult;
use quillpress_core::models::engagement::EngagementOutcome;
use quillpress_core::repository::EngagementRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Result of the IF/ELSE arm inside the transaction.
#[derive(Debug, SurrealValue)]
struct OutcomeRow {
    is_new: bool,
}

const RECORD_VIEW_QUERY: &str = "\
BEGIN TRANSACTION; \
LET $post = (SELECT id FROM type::record('post', $post_id) \
    WHERE tenant_id = $tenant_id); \
IF array::len($post) == 0 { THROW 'post not found' }; \
LET $live = (SELECT id, recorded_at FROM engagement \
    WHERE tenant_id = $tenant_id AND post_id = $post_id \
    AND identity = $identity AND kind = 'VIEW'); \
IF array::len($live) == 0 { \
    CREATE engagement SET tenant_id = $tenant_id, post_id = $post_id, \
        identity = $identity, kind = 'VIEW', recorded_at = time::now(); \
    UPDATE type::record('post', $post_id) SET \
        view_count += 1, updated_at = time::now() \
        WHERE tenant_id = $tenant_id; \
    RETURN { is_new: true }; \
} ELSE IF $live[0].recorded_at < $stale_before { \
    UPDATE $live[0].id SET recorded_at = time::now(); \
    UPDATE type::record('post', $post_id) SET \
        view_count += 1, updated_at = time::now() \
        WHERE tenant_id = $tenant_id; \
    RETURN { is_new: true }; \
} ELSE { \
    RETURN { is_new: false }; \
}; \
SELECT VALUE view_count FROM type::record('post', $post_id); \
COMMIT TRANSACTION;";

const TOGGLE_LIKE_QUERY: &str = "\
BEGIN TRANSACTION; \
LET $post = (SELECT id FROM type::record('post', $post_id) \
    WHERE tenant_id = $tenant_id); \
IF array::len($post) == 0 { THROW 'post not found' }; \
LET $live = (SELECT id FROM engagement \
    WHERE tenant_id = $tenant_id AND post_id = $post_id \
    AND identity = $identity AND kind = 'LIKE'); \
IF array::len($live) > 0 { \
    DELETE engagement \
        WHERE tenant_id = $tenant_id AND post_id = $post_id \
        AND identity = $identity AND kind = 'LIKE'; \
    UPDATE type::record('post', $post_id) SET \
        like_count -= 1, updated_at = time::now() \
        WHERE tenant_id = $tenant_id; \
    RETURN { is_new: false }; \
} ELSE { \
    CREATE engagement SET tenant_id = $tenant_id, post_id = $post_id, \
        identity = $identity, kind = 'LIKE', recorded_at = time::now(); \
    UPDATE type::record('post', $post_id) SET \
        like_count += 1, updated_at = time::now() \
        WHERE tenant_id = $tenant_id; \
    RETURN { is_new: true }; \
}; \
SELECT VALUE like_count FROM type::record('post', $post_id); \
COMMIT TRANSACTION;";

/// SurrealDB implementation of the Engagement repository.
#[derive(Clone)]
pub struct SurrealEngagementRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEngagementRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn run_engagement_query(
        &self,
        query: &'static str,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &str,
        stale_before: Option<DateTime<Utc>>,
    ) -> CoreResult<EngagementOutcome> {
        let mut builder = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("post_id", post_id.to_string()))
            .bind(("identity", identity.to_string()));
        if let Some(stale_before) = stale_before {
            builder = builder.bind(("stale_before", stale_before));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| {
            let message = e.to_string();
            if message.contains("post not found") {
                DbError::NotFound {
                    entity: "post".into(),
                    id: post_id.to_string(),
                }
            } else {
                DbError::Migration(message)
            }
        })?;

        // Statements: 0 LET post, 1 guard IF, 2 LET live, 3 outcome IF,
        // 4 counter SELECT.
        let outcome: Option<OutcomeRow> = result.take(3).map_err(DbError::from)?;
        let outcome = outcome.ok_or_else(|| {
            DbError::Migration("engagement transaction returned no outcome".into())
        })?;

        let counts: Vec<u64> = result.take(4).map_err(DbError::from)?;
        let current_count = counts.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "post".into(),
            id: post_id.to_string(),
        })?;

        Ok(EngagementOutcome {
            is_new: outcome.is_new,
            current_count,
        })
    }
}

impl<C: Connection> EngagementRepository for SurrealEngagementRepository<C> {
    async fn record_view(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &str,
        stale_before: DateTime<Utc>,
    ) -> CoreResult<EngagementOutcome> {
        self.run_engagement_query(
            RECORD_VIEW_QUERY,
            tenant_id,
            post_id,
            identity,
            Some(stale_before),
        )
        .await
    }

    async fn toggle_like(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &str,
    ) -> CoreResult<EngagementOutcome> {
        self.run_engagement_query(TOGGLE_LIKE_QUERY, tenant_id, post_id, identity, None)
            .await
    }
}
