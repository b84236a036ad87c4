//! Tenant-configurable password policy and Argon2id verification.
//!
//! Policy data comes from the tenant record, never from process-wide
//! constants: different tenants run different complexity rules.

use argon2::{Argon2, PasswordVerifier};
use quillpress_core::error::{CoreError, CoreResult};
use quillpress_core::models::tenant::PasswordPolicy;

use crate::error::AuthError;

/// The character set satisfying the `require_special` rule.
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"|,.<>/?";

/// Validate a candidate password against a tenant's policy.
///
/// Rules are checked in a fixed order — minimum length, uppercase, digit,
/// special character — and the first failing rule short-circuits with a
/// message naming the rule and the tenant's threshold. Each rule is
/// evaluated independently of the others.
pub fn validate_password(policy: &PasswordPolicy, candidate: &str) -> CoreResult<()> {
    if candidate.chars().count() < policy.min_length {
        return Err(CoreError::Validation {
            message: format!(
                "password must be at least {} characters long",
                policy.min_length
            ),
        });
    }

    if policy.require_uppercase && !candidate.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(CoreError::Validation {
            message: "password must contain an uppercase letter".into(),
        });
    }

    if policy.require_number && !candidate.chars().any(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation {
            message: "password must contain a number".into(),
        });
    }

    if policy.require_special && !candidate.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(CoreError::Validation {
            message: "password must contain a special character".into(),
        });
    }

    Ok(())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or an error if
/// the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> CoreResult<bool> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}")).into()),
    }
}
