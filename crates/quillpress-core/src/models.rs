//! Domain models for Quillpress.
//!
//! These are the core types shared across all crates. Every entity other
//! than the tenant itself is scoped to exactly one tenant.

pub mod engagement;
pub mod post;
pub mod tenant;
pub mod user;
