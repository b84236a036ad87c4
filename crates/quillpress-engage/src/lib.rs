//! Quillpress Engage — deduplication of anonymous and authenticated
//! engagement signals (views/likes) and featured-slot ranking.

pub mod featured;
pub mod policy;
pub mod service;

pub use featured::FeaturedRanker;
pub use policy::DedupWindow;
pub use service::EngagementService;

use quillpress_core::models::engagement::EngagementIdentity;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Dedup identity for one request: the user id when authenticated, else
/// a one-way hash of the client IP. Never both.
pub fn identity_for(user_id: Option<Uuid>, client_ip: &str) -> EngagementIdentity {
    match user_id {
        Some(id) => EngagementIdentity::User(id),
        None => EngagementIdentity::IpHash(hash_ip(client_ip)),
    }
}

/// SHA-256 hash of a client IP, hex-encoded. The raw address is never
/// stored.
pub fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}
