//! Tenant-scoped session token issuance and verification.
//!
//! Two signing strategies are supported as alternative configurations,
//! selected once at startup: per-tenant HMAC secrets, or one service-wide
//! RS256 keypair whose tenant boundary is enforced by the embedded tenant
//! claim. Claim checks after signature verification run in a fixed order —
//! tenant match first, then expiry, then issuer/audience — so a
//! cross-tenant token is always reported as a tenant-isolation breach
//! rather than a stale credential.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use quillpress_core::error::CoreResult;
use quillpress_core::models::tenant::Tenant;
use quillpress_core::models::user::Role;
use rsa::BigUint;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{AuthConfig, SigningConfig};
use crate::error::AuthError;
use crate::jwks::{Jwk, JwksDocument};

/// JWT claims embedded in every session token.
///
/// `userId`/`tenantId` are the custom claims external verifiers (edge
/// proxies) key on; `iss`/`aud`/`exp` are standard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID (UUID string).
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Tenant ID (UUID string).
    #[serde(rename = "tenantId")]
    pub tenant_id: String,
    pub role: Role,
    pub email: String,
    /// Issuer — `auth-service:<tenantName>` (HMAC) or
    /// `https://<tenantDomain>` (RS256).
    pub iss: String,
    /// Audience — the tenant domain in both modes.
    pub aud: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Token signing capability, fixed at startup from [`AuthConfig`].
pub enum TokenSigner {
    /// Sign/verify with each tenant's own secret.
    Hmac,
    /// Sign/verify every tenant's tokens with one service keypair.
    Rsa {
        encoding: EncodingKey,
        decoding: DecodingKey,
        jwk: Jwk,
    },
}

impl TokenSigner {
    /// Build the signer from configuration. In RS256 mode the keypair is
    /// parsed eagerly so a bad deployment fails at startup, not per
    /// request.
    pub fn from_config(config: &AuthConfig) -> CoreResult<Self> {
        match &config.signing {
            SigningConfig::HmacPerTenant => Ok(TokenSigner::Hmac),
            SigningConfig::Rsa {
                private_key_pem,
                public_key_pem,
            } => {
                let encoding = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
                    .map_err(|e| AuthError::MissingKeyMaterial(format!("bad private key: {e}")))?;
                let decoding = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
                    .map_err(|e| AuthError::MissingKeyMaterial(format!("bad public key: {e}")))?;
                let jwk = rsa_public_jwk(public_key_pem)?;
                Ok(TokenSigner::Rsa {
                    encoding,
                    decoding,
                    jwk,
                })
            }
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            TokenSigner::Hmac => Algorithm::HS256,
            TokenSigner::Rsa { .. } => Algorithm::RS256,
        }
    }

    /// The `iss` claim for tokens of `tenant` under this signing mode.
    pub fn issuer(&self, tenant: &Tenant) -> String {
        match self {
            TokenSigner::Hmac => format!("auth-service:{}", tenant.name),
            TokenSigner::Rsa { .. } => format!("https://{}", tenant.domain),
        }
    }

    /// Issue a signed session token scoped to `tenant`.
    pub fn issue(
        &self,
        tenant: &Tenant,
        user_id: Uuid,
        role: Role,
        email: &str,
    ) -> CoreResult<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            user_id: user_id.to_string(),
            tenant_id: tenant.id.to_string(),
            role,
            email: email.to_string(),
            iss: self.issuer(tenant),
            aud: tenant.domain.clone(),
            iat: now,
            exp: now + tenant.token_lifetime_secs as i64,
        };

        let header = Header::new(self.algorithm());
        let key = self.encoding_key(tenant)?;
        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")).into())
    }

    /// Verify a token presented under `tenant` and return its claims.
    ///
    /// Failure taxonomy: malformed or badly signed tokens are
    /// [`AuthError::TokenInvalid`]; an expired but otherwise valid token is
    /// [`AuthError::TokenExpired`]; a valid token embedding a different
    /// tenant id is [`AuthError::TenantMismatch`], checked before any
    /// other claim is consumed.
    pub fn verify(&self, tenant: &Tenant, token: &str) -> CoreResult<SessionClaims> {
        let key = self.decoding_key(tenant)?;

        // Signature-only validation; the claim checks below replace the
        // library's defaults so the failure order is fixed.
        let mut validation = Validation::new(self.algorithm());
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = Default::default();

        let data = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
            .map_err(|e| AuthError::TokenInvalid(e.to_string()))?;
        let claims = data.claims;

        if claims.tenant_id != tenant.id.to_string() {
            return Err(AuthError::TenantMismatch.into());
        }
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired.into());
        }
        if claims.iss != self.issuer(tenant) || claims.aud != tenant.domain {
            return Err(AuthError::TokenInvalid("issuer or audience mismatch".into()).into());
        }

        Ok(claims)
    }

    /// Verify `old_token` and re-issue with a fresh expiry.
    ///
    /// Role and email are carried over from the old token without
    /// re-reading the user record; a role revoked after issuance survives
    /// until the refreshed token expires.
    pub fn refresh(&self, tenant: &Tenant, old_token: &str) -> CoreResult<String> {
        let claims = self.verify(tenant, old_token)?;
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|e| AuthError::TokenInvalid(format!("bad user id claim: {e}")))?;
        self.issue(tenant, user_id, claims.role, &claims.email)
    }

    /// The JWKS document for external verifiers. Empty when no public key
    /// is configured (HMAC mode).
    pub fn jwks(&self) -> JwksDocument {
        match self {
            TokenSigner::Hmac => JwksDocument { keys: Vec::new() },
            TokenSigner::Rsa { jwk, .. } => JwksDocument {
                keys: vec![jwk.clone()],
            },
        }
    }

    fn encoding_key(&self, tenant: &Tenant) -> Result<EncodingKey, AuthError> {
        match self {
            TokenSigner::Hmac => {
                let secret = tenant_secret(tenant)?;
                Ok(EncodingKey::from_secret(secret.as_bytes()))
            }
            TokenSigner::Rsa { encoding, .. } => Ok(encoding.clone()),
        }
    }

    fn decoding_key(&self, tenant: &Tenant) -> Result<DecodingKey, AuthError> {
        match self {
            TokenSigner::Hmac => {
                let secret = tenant_secret(tenant)?;
                Ok(DecodingKey::from_secret(secret.as_bytes()))
            }
            TokenSigner::Rsa { decoding, .. } => Ok(decoding.clone()),
        }
    }
}

fn tenant_secret(tenant: &Tenant) -> Result<&str, AuthError> {
    tenant.token_secret.as_deref().ok_or_else(|| {
        AuthError::MissingKeyMaterial(format!("tenant {} has no signing secret", tenant.name))
    })
}

/// Generate a tenant signing secret: 64 random bytes (512 bits),
/// base64url-encoded without padding.
pub fn generate_tenant_secret() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 64] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the public JWK for an RSA public key PEM.
fn rsa_public_jwk(public_key_pem: &str) -> Result<Jwk, AuthError> {
    let public_key = rsa::RsaPublicKey::from_public_key_pem(public_key_pem)
        .map_err(|e| AuthError::MissingKeyMaterial(format!("bad public key: {e}")))?;

    Ok(Jwk {
        kty: "RSA".into(),
        kid: key_id(public_key_pem),
        alg: "RS256".into(),
        use_field: "sig".into(),
        n: URL_SAFE_NO_PAD.encode(biguint_bytes(public_key.n())),
        e: URL_SAFE_NO_PAD.encode(biguint_bytes(public_key.e())),
    })
}

fn biguint_bytes(value: &BigUint) -> Vec<u8> {
    value.to_bytes_be()
}

/// Stable key id: truncated SHA-256 of the public key PEM.
fn key_id(public_key_pem: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(public_key_pem.as_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}
