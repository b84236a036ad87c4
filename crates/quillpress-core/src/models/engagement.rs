//! Engagement (view/like) domain model.
//!
//! An engagement record deduplicates one identity's interaction with one
//! post. The post counter must always equal the number of live records
//! that are due, so record and counter mutate in a single atomic unit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum EngagementKind {
    View,
    Like,
}

impl EngagementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EngagementKind::View => "VIEW",
            EngagementKind::Like => "LIKE",
        }
    }
}

/// Dedup key for one caller: authenticated users by id, anonymous callers
/// by a one-way hash of their client IP. The two are mutually exclusive —
/// an authenticated user's engagement is never also tracked by IP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EngagementIdentity {
    User(Uuid),
    IpHash(String),
}

impl fmt::Display for EngagementIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngagementIdentity::User(id) => write!(f, "user:{id}"),
            EngagementIdentity::IpHash(hash) => write!(f, "ip:{hash}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub tenant_id: Uuid,
    pub post_id: Uuid,
    pub identity: String,
    pub kind: EngagementKind,
    pub recorded_at: DateTime<Utc>,
}

/// Result of recording an engagement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngagementOutcome {
    /// Whether the event counted as a new unique engagement.
    pub is_new: bool,
    /// The post's counter for this kind after the operation.
    pub current_count: u64,
}
