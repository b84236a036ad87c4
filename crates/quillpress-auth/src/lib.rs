//! Quillpress Auth — tenant resolution, password policy enforcement,
//! tenant-scoped token issuance/verification, and request identity.

pub mod admin;
pub mod config;
pub mod error;
pub mod identity;
pub mod jwks;
pub mod password;
pub mod service;
pub mod tenancy;
pub mod token;

pub use config::{AuthConfig, SigningConfig};
pub use error::AuthError;
pub use identity::{IdentityResolver, Principal};
pub use tenancy::{TenantRegistry, TenantSelector};
pub use token::{SessionClaims, TokenSigner};
