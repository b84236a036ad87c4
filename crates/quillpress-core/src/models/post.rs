//! Post (content item) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostStatus {
    Published,
    Draft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    pub view_count: u64,
    pub like_count: u64,
    /// At most one post per tenant holds the featured slot.
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    pub tenant_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
}

/// Counter snapshot used by the featured ranker; avoids dragging full
/// post rows through the scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEngagementSnapshot {
    pub id: Uuid,
    pub view_count: u64,
    pub like_count: u64,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}
