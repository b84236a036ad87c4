//! Featured-slot ranking.
//!
//! A pull-based, idempotent recompute rather than an incrementally
//! maintained index: tenant content volumes are small, so rescoring every
//! published post on each trigger is cheap and cannot drift.

use quillpress_core::error::CoreResult;
use quillpress_core::models::post::PostEngagementSnapshot;
use quillpress_core::repository::PostRepository;
use uuid::Uuid;

/// One like is worth five views.
pub const LIKE_WEIGHT: u64 = 5;

pub fn score(snapshot: &PostEngagementSnapshot) -> u64 {
    snapshot.like_count * LIKE_WEIGHT + snapshot.view_count
}

/// Recomputes which post holds the single featured slot per tenant.
pub struct FeaturedRanker<P: PostRepository> {
    posts: P,
}

impl<P: PostRepository> FeaturedRanker<P> {
    pub fn new(posts: P) -> Self {
        Self { posts }
    }

    /// Recompute the featured slot for `tenant_id`, returning the
    /// winner's id.
    ///
    /// Ties break deterministically: the more recently published post
    /// wins, residual ties go to the greater id. When the winner already
    /// holds the slot nothing is written; otherwise the clear-all and
    /// set-one writes run as one atomic unit in the repository. With no
    /// published posts, every flag is cleared.
    pub async fn recompute(&self, tenant_id: Uuid) -> CoreResult<Option<Uuid>> {
        let snapshot = self.posts.engagement_snapshot(tenant_id).await?;

        let winner = snapshot.iter().max_by(|a, b| {
            score(a)
                .cmp(&score(b))
                .then_with(|| a.published_at.cmp(&b.published_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        match winner {
            None => {
                self.posts.clear_featured(tenant_id).await?;
                Ok(None)
            }
            Some(winner) => {
                if !winner.featured {
                    self.posts
                        .set_featured_exclusive(tenant_id, winner.id)
                        .await?;
                }
                Ok(Some(winner.id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn snapshot(likes: u64, views: u64) -> PostEngagementSnapshot {
        PostEngagementSnapshot {
            id: Uuid::new_v4(),
            view_count: views,
            like_count: likes,
            featured: false,
            published_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn like_weight_is_five_views() {
        // 10 likes + 20 views = 70; 71 plain views win by one point.
        let weighted = snapshot(10, 20);
        let plain = snapshot(0, 71);
        assert_eq!(score(&weighted), 70);
        assert_eq!(score(&plain), 71);
    }

    #[test]
    fn equal_scores_prefer_newer_publication() {
        let mut older = snapshot(1, 0);
        older.published_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut newer = snapshot(0, 5);
        newer.published_at = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(score(&older), score(&newer));

        let winner = [older.clone(), newer.clone()]
            .iter()
            .max_by(|a, b| {
                score(a)
                    .cmp(&score(b))
                    .then_with(|| a.published_at.cmp(&b.published_at))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|s| s.id);
        assert_eq!(winner, Some(newer.id));
    }
}
