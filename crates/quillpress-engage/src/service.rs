//! Engagement recording over the atomic repository primitives.

use chrono::Utc;
use quillpress_core::error::CoreResult;
use quillpress_core::models::engagement::{EngagementIdentity, EngagementOutcome};
use quillpress_core::repository::EngagementRepository;
use uuid::Uuid;

use crate::policy::DedupWindow;

/// Decides whether an engagement counts as new and updates counters.
///
/// Generic over the engagement repository; the repository guarantees
/// that record and counter mutate atomically, this service supplies the
/// staleness cutoff from the configured window.
pub struct EngagementService<E: EngagementRepository> {
    engagements: E,
    window: DedupWindow,
}

impl<E: EngagementRepository> EngagementService<E> {
    pub fn new(engagements: E, window: DedupWindow) -> Self {
        Self {
            engagements,
            window,
        }
    }

    /// Record a view. A record absent or stale under the configured
    /// window counts as new; its timestamp refreshes in the same atomic
    /// step as the counter increment.
    pub async fn record_view(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &EngagementIdentity,
    ) -> CoreResult<EngagementOutcome> {
        let stale_before = self.window.stale_before(Utc::now());
        self.engagements
            .record_view(tenant_id, post_id, &identity.to_string(), stale_before)
            .await
    }

    /// Toggle a like: a live record is removed and the counter
    /// decremented, otherwise created and incremented.
    pub async fn toggle_like(
        &self,
        tenant_id: Uuid,
        post_id: Uuid,
        identity: &EngagementIdentity,
    ) -> CoreResult<EngagementOutcome> {
        self.engagements
            .toggle_like(tenant_id, post_id, &identity.to_string())
            .await
    }
}
