//! Authentication configuration.

/// Token signing strategy, fixed at startup.
#[derive(Debug, Clone)]
pub enum SigningConfig {
    /// Every tenant signs with its own random secret (HS256). Tokens from
    /// one tenant fail signature verification under any other.
    HmacPerTenant,
    /// One service-wide RS256 keypair signs all tenants' tokens; the
    /// tenant boundary is enforced by the embedded tenant claim. The
    /// public key is published as JWKS for external verifiers.
    Rsa {
        private_key_pem: String,
        public_key_pem: String,
    },
}

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing: SigningConfig,
    /// Token lifetime applied to tenants created without an override
    /// (default: 86_400 = 24 hours).
    pub default_token_lifetime_secs: u64,
    /// Process-wide secret gating tenant administration endpoints.
    pub super_admin_key: String,
    /// OAuth emails promoted to ADMIN at login time. Injected here rather
    /// than read from the environment at each login.
    pub admin_oauth_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing: SigningConfig::HmacPerTenant,
            default_token_lifetime_secs: 86_400,
            super_admin_key: String::new(),
            admin_oauth_emails: Vec::new(),
        }
    }
}
