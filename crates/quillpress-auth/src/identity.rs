//! Request identity resolution.
//!
//! Identity comes from an ordered chain of strategies; the first
//! applicable one wins. A gateway or service mesh that already verified a
//! token injects `x-user-id`/`x-user-email`/`x-user-role`, which are
//! trusted outright; otherwise the bearer token from `Authorization` is
//! verified against the tenant's signing material. Both deployments share
//! this code path, selected per request.

use http::HeaderMap;
use http::header::AUTHORIZATION;
use quillpress_core::error::{CoreError, CoreResult};
use quillpress_core::models::tenant::Tenant;
use quillpress_core::models::user::Role;
use uuid::Uuid;

use crate::error::AuthError;
use crate::token::TokenSigner;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The resolved acting identity for a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Resolves principals against one tenant's signing material.
pub struct IdentityResolver<'a> {
    signer: &'a TokenSigner,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(signer: &'a TokenSigner) -> Self {
        Self { signer }
    }

    /// Resolve the acting principal, or fail with 401 when no strategy
    /// applies.
    pub fn authenticate(&self, tenant: &Tenant, headers: &HeaderMap) -> CoreResult<Principal> {
        self.authenticate_optional(tenant, headers)?
            .ok_or(CoreError::Unauthenticated {
                reason: "no credential present".into(),
            })
    }

    /// Resolve the principal if a credential is present.
    ///
    /// An absent credential yields `Ok(None)`; a credential that is
    /// present but malformed or unverifiable is still an error.
    pub fn authenticate_optional(
        &self,
        tenant: &Tenant,
        headers: &HeaderMap,
    ) -> CoreResult<Option<Principal>> {
        if let Some(principal) = from_trusted_headers(headers, tenant.id)? {
            return Ok(Some(principal));
        }
        if let Some(principal) = self.from_bearer(tenant, headers)? {
            return Ok(Some(principal));
        }
        Ok(None)
    }

    fn from_bearer(&self, tenant: &Tenant, headers: &HeaderMap) -> CoreResult<Option<Principal>> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let value = value.to_str().map_err(|_| CoreError::Unauthenticated {
            reason: "malformed Authorization header".into(),
        })?;
        let token = extract_bearer_token(value).ok_or(CoreError::Unauthenticated {
            reason: "Authorization header is not a bearer token".into(),
        })?;

        let claims = self.signer.verify(tenant, token)?;
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|e| AuthError::TokenInvalid(format!("bad user id claim: {e}")))?;

        Ok(Some(Principal {
            user_id,
            tenant_id: tenant.id,
            email: claims.email,
            role: claims.role,
        }))
    }
}

/// Strategy 1: identity headers injected by a trusted upstream.
///
/// Not applicable when `x-user-id` is absent; malformed values in any of
/// the three headers fail the request rather than falling through to the
/// bearer path, since a half-injected identity indicates a broken
/// gateway, not an anonymous caller.
fn from_trusted_headers(headers: &HeaderMap, tenant_id: Uuid) -> CoreResult<Option<Principal>> {
    let Some(raw_id) = header_str(headers, USER_ID_HEADER)? else {
        return Ok(None);
    };

    let user_id = Uuid::parse_str(raw_id).map_err(|_| CoreError::Unauthenticated {
        reason: format!("invalid {USER_ID_HEADER} header"),
    })?;
    let email = header_str(headers, USER_EMAIL_HEADER)?
        .ok_or(CoreError::Unauthenticated {
            reason: format!("missing {USER_EMAIL_HEADER} header"),
        })?
        .to_string();
    let role = header_str(headers, USER_ROLE_HEADER)?
        .and_then(parse_role)
        .ok_or(CoreError::Unauthenticated {
            reason: format!("missing or invalid {USER_ROLE_HEADER} header"),
        })?;

    Ok(Some(Principal {
        user_id,
        tenant_id,
        email,
        role,
    }))
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> CoreResult<Option<&'h str>> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| CoreError::Unauthenticated {
                reason: format!("malformed {name} header"),
            }),
    }
}

fn parse_role(value: &str) -> Option<Role> {
    match value {
        "USER" => Some(Role::User),
        "ADMIN" => Some(Role::Admin),
        _ => None,
    }
}

/// Extract the token from a `Bearer <token>` header value.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Role gate for privileged endpoints.
pub fn require_admin(principal: &Principal) -> CoreResult<()> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            reason: "admin role required".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use quillpress_core::models::tenant::PasswordPolicy;

    use super::*;
    use crate::token::generate_tenant_secret;

    fn tenant() -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "acme".into(),
            domain: "acme.example.com".into(),
            token_secret: Some(generate_tenant_secret()),
            token_lifetime_secs: 3600,
            allow_registration: true,
            allow_oauth: false,
            oauth_client_id: None,
            oauth_client_secret: None,
            password_policy: PasswordPolicy::default(),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn trusted_headers(id: Uuid, email: &str, role: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, id.to_string().parse().unwrap());
        headers.insert(USER_EMAIL_HEADER, email.parse().unwrap());
        headers.insert(USER_ROLE_HEADER, role.parse().unwrap());
        headers
    }

    #[test]
    fn trusted_headers_resolve_without_token() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let tenant = tenant();
        let user_id = Uuid::new_v4();

        let headers = trusted_headers(user_id, "alice@acme.test", "ADMIN");
        let principal = resolver.authenticate(&tenant, &headers).unwrap();

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.tenant_id, tenant.id);
    }

    #[test]
    fn trusted_headers_win_over_bearer_token() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let tenant = tenant();
        let header_user = Uuid::new_v4();
        let token_user = Uuid::new_v4();

        let token = signer
            .issue(&tenant, token_user, Role::User, "token@acme.test")
            .unwrap();
        let mut headers = trusted_headers(header_user, "header@acme.test", "USER");
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());

        let principal = resolver.authenticate(&tenant, &headers).unwrap();
        assert_eq!(principal.user_id, header_user);
    }

    #[test]
    fn bearer_token_resolves_when_no_trusted_headers() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let tenant = tenant();
        let user_id = Uuid::new_v4();

        let token = signer
            .issue(&tenant, user_id, Role::User, "alice@acme.test")
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());

        let principal = resolver.authenticate(&tenant, &headers).unwrap();
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.role, Role::User);
    }

    #[test]
    fn absent_credentials_fail_required_auth() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let err = resolver
            .authenticate(&tenant(), &HeaderMap::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated { .. }));
    }

    #[test]
    fn absent_credentials_are_none_for_optional_auth() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let resolved = resolver
            .authenticate_optional(&tenant(), &HeaderMap::new())
            .unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn present_but_invalid_token_fails_optional_auth() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer garbage".parse().unwrap());

        assert!(
            resolver
                .authenticate_optional(&tenant(), &headers)
                .is_err()
        );
    }

    #[test]
    fn invalid_role_header_is_rejected() {
        let signer = TokenSigner::Hmac;
        let resolver = IdentityResolver::new(&signer);
        let headers = trusted_headers(Uuid::new_v4(), "a@acme.test", "ROOT");
        assert!(resolver.authenticate(&tenant(), &headers).is_err());
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn admin_gate() {
        let admin = Principal {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            email: "a@x.test".into(),
            role: Role::Admin,
        };
        let user = Principal {
            role: Role::User,
            ..admin.clone()
        };
        assert!(require_admin(&admin).is_ok());
        assert!(require_admin(&user).is_err());
    }
}
