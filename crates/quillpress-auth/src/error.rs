//! Authentication error types.

use quillpress_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is suspended")]
    AccountSuspended,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// A cryptographically valid token carrying a different tenant id
    /// than the tenant it was presented under. Logically a forged or
    /// stolen token, so this maps to 403 rather than 401.
    #[error("token does not belong to this tenant")]
    TenantMismatch,

    #[error("signing key material is missing: {0}")]
    MissingKeyMaterial(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for CoreError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::TokenExpired => {
                CoreError::Unauthenticated {
                    reason: err.to_string(),
                }
            }
            AuthError::TokenInvalid(_) => CoreError::Unauthenticated {
                reason: err.to_string(),
            },
            AuthError::AccountSuspended | AuthError::TenantMismatch => CoreError::Forbidden {
                reason: err.to_string(),
            },
            AuthError::MissingKeyMaterial(msg) => CoreError::Configuration(msg),
            AuthError::Crypto(msg) => CoreError::Crypto(msg),
        }
    }
}
