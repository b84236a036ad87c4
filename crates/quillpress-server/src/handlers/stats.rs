//! Tenant statistics for the admin dashboard.
//!
//! The date-window counts are independent reads, so they fan out
//! concurrently and join before the response — no shared mutable state.

use axum::Json;
use axum::extract::State;
use chrono::{Duration, Utc};
use quillpress_core::repository::{PostRepository, UserRepository};
use serde::Serialize;

use crate::error::ApiResult;
use crate::middleware::CurrentTenant;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users_today: u64,
    pub users_this_week: u64,
    pub users_this_month: u64,
    pub total_posts: u64,
}

pub async fn tenant_stats(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> ApiResult<Json<StatsResponse>> {
    let now = Utc::now();

    let (users_today, users_this_week, users_this_month, total_posts) = tokio::try_join!(
        state
            .users
            .count_created_between(tenant.id, now - Duration::days(1), now),
        state
            .users
            .count_created_between(tenant.id, now - Duration::days(7), now),
        state
            .users
            .count_created_between(tenant.id, now - Duration::days(30), now),
        state.posts.count(tenant.id),
    )?;

    Ok(Json(StatsResponse {
        users_today,
        users_this_week,
        users_this_month,
        total_posts,
    }))
}
