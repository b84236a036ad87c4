//! Tenant domain model.
//!
//! Tenants provide full data isolation: users, posts, and engagement
//! records are partitioned by tenant id, and each tenant carries its own
//! security configuration (signing secret, password policy, feature flags).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Password complexity rules, configurable per tenant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_number: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_number: true,
            require_special: false,
        }
    }
}

/// An isolated customer/site boundary.
///
/// `name` is globally unique and doubles as the subdomain label under
/// which the tenant is reachable. Signing material (`token_secret`) never
/// crosses tenant boundaries; it is `None` in deployments that sign with
/// the service-wide RS256 keypair instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub domain: String,
    /// Per-tenant HMAC signing secret (base64url, 512 bits of entropy).
    pub token_secret: Option<String>,
    /// Session token lifetime in seconds.
    pub token_lifetime_secs: u64,
    pub allow_registration: bool,
    pub allow_oauth: bool,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub password_policy: PasswordPolicy,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub domain: String,
    /// Generated by the caller at creation time; see
    /// `quillpress_auth::token::generate_tenant_secret`.
    pub token_secret: Option<String>,
    pub token_lifetime_secs: u64,
    pub allow_registration: bool,
    pub allow_oauth: bool,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
    pub password_policy: PasswordPolicy,
}

/// Fields that can be updated on an existing tenant.
///
/// The signing secret is deliberately absent: it is generated once at
/// creation and never rotated through this path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub domain: Option<String>,
    pub token_lifetime_secs: Option<u64>,
    pub allow_registration: Option<bool>,
    pub allow_oauth: Option<bool>,
    /// `Some(Some(v))` = set, `Some(None)` = clear, `None` = no change.
    pub oauth_client_id: Option<Option<String>>,
    pub oauth_client_secret: Option<Option<String>>,
    pub password_policy: Option<PasswordPolicy>,
    pub active: Option<bool>,
}
