//! Authentication service — registration, login, OAuth login, and token
//! refresh orchestration.

use std::sync::Arc;

use chrono::Utc;
use quillpress_core::error::{CoreError, CoreResult};
use quillpress_core::models::tenant::Tenant;
use quillpress_core::models::user::{CreateUser, Role, UpdateUser, User, UserStatus};
use quillpress_core::repository::UserRepository;

use crate::error::AuthError;
use crate::password;
use crate::token::TokenSigner;

/// Successful authentication result.
#[derive(Debug)]
pub struct AuthOutput {
    pub user: User,
    /// Signed session token scoped to the tenant.
    pub token: String,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    users: U,
    signer: Arc<TokenSigner>,
    /// OAuth emails promoted to ADMIN, evaluated at each login.
    admin_oauth_emails: Vec<String>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U, signer: Arc<TokenSigner>, admin_oauth_emails: Vec<String>) -> Self {
        Self {
            users,
            signer,
            admin_oauth_emails,
        }
    }

    /// Register a new password-based account under `tenant`.
    pub async fn register(
        &self,
        tenant: &Tenant,
        email: &str,
        candidate_password: &str,
    ) -> CoreResult<AuthOutput> {
        if !tenant.allow_registration {
            return Err(CoreError::Forbidden {
                reason: format!("registration is disabled for tenant {}", tenant.name),
            });
        }

        password::validate_password(&tenant.password_policy, candidate_password)?;

        let user = self
            .users
            .create(CreateUser {
                tenant_id: tenant.id,
                email: email.to_string(),
                password: Some(candidate_password.to_string()),
                oauth_subject: None,
                role: Role::User,
            })
            .await?;

        let token = self
            .signer
            .issue(tenant, user.id, user.role, &user.email)?;
        Ok(AuthOutput { user, token })
    }

    /// Authenticate with email + password and issue a session token.
    pub async fn login(
        &self,
        tenant: &Tenant,
        email: &str,
        candidate_password: &str,
    ) -> CoreResult<AuthOutput> {
        // 1. Look up the user; an unknown email reads the same as a wrong
        //    password to the caller.
        let user = match self.users.get_by_email(tenant.id, email).await {
            Ok(u) => u,
            Err(CoreError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        // 2. Verify the password. OAuth-only accounts have no hash.
        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials.into());
        };
        if !password::verify_password(candidate_password, hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Check account status.
        check_status(&user)?;

        // 4. Stamp last login and issue the token.
        let user = self
            .users
            .update(
                tenant.id,
                user.id,
                UpdateUser {
                    last_login_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        let token = self
            .signer
            .issue(tenant, user.id, user.role, &user.email)?;
        Ok(AuthOutput { user, token })
    }

    /// Authenticate via an external OAuth identity.
    ///
    /// Finds the account by provider subject, links by email for accounts
    /// created before the OAuth provider was connected, or creates a new
    /// account. The admin allow-list is evaluated on every login, so a
    /// newly allow-listed email is promoted at its next sign-in.
    pub async fn oauth_login(
        &self,
        tenant: &Tenant,
        subject: &str,
        email: &str,
    ) -> CoreResult<AuthOutput> {
        if !tenant.allow_oauth {
            return Err(CoreError::Forbidden {
                reason: format!("OAuth login is disabled for tenant {}", tenant.name),
            });
        }

        let existing = match self.users.get_by_oauth_subject(tenant.id, subject).await {
            Ok(user) => Some(user),
            Err(CoreError::NotFound { .. }) => {
                match self.users.get_by_email(tenant.id, email).await {
                    Ok(user) => Some(user),
                    Err(CoreError::NotFound { .. }) => None,
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        let allow_listed = self.admin_oauth_emails.iter().any(|e| e == email);

        let user = match existing {
            Some(user) => {
                check_status(&user)?;
                let promote = allow_listed && user.role != Role::Admin;
                self.users
                    .update(
                        tenant.id,
                        user.id,
                        UpdateUser {
                            oauth_subject: Some(subject.to_string()),
                            role: promote.then_some(Role::Admin),
                            last_login_at: Some(Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?
            }
            None => {
                let role = if allow_listed { Role::Admin } else { Role::User };
                self.users
                    .create(CreateUser {
                        tenant_id: tenant.id,
                        email: email.to_string(),
                        password: None,
                        oauth_subject: Some(subject.to_string()),
                        role,
                    })
                    .await?
            }
        };

        let token = self
            .signer
            .issue(tenant, user.id, user.role, &user.email)?;
        Ok(AuthOutput { user, token })
    }

    /// Verify `old_token` and issue a replacement with a fresh expiry.
    ///
    /// Role and email come from the old token, not the user record; see
    /// [`TokenSigner::refresh`].
    pub async fn refresh(&self, tenant: &Tenant, old_token: &str) -> CoreResult<String> {
        self.signer.refresh(tenant, old_token)
    }
}

fn check_status(user: &User) -> CoreResult<()> {
    match user.status {
        UserStatus::Active => Ok(()),
        UserStatus::Suspended => Err(AuthError::AccountSuspended.into()),
        // A deleted account reads the same as an unknown one.
        UserStatus::Deleted => Err(AuthError::InvalidCredentials.into()),
    }
}
