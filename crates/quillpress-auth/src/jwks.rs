//! JWKS document types for the published discovery endpoint.
//!
//! Only public key material crosses this boundary. External verifiers
//! (e.g. an edge proxy validating JWTs before the request reaches the
//! service) fetch `/.well-known/jwks.json` and verify RS256 signatures
//! with the `n`/`e` components.

use serde::Serialize;

/// A single RSA public key in JWK form.
#[derive(Debug, Clone, Serialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    pub alg: String,
    #[serde(rename = "use")]
    pub use_field: String,
    /// Modulus, base64url without padding.
    pub n: String,
    /// Public exponent, base64url without padding.
    pub e: String,
}

/// The JWKS payload. `keys` is empty when the deployment has no public
/// key configured (per-tenant HMAC mode).
#[derive(Debug, Clone, Serialize)]
pub struct JwksDocument {
    pub keys: Vec<Jwk>,
}
