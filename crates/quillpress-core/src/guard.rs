//! Admin-protection invariants.
//!
//! Privileged accounts must not be altered or removed by their peers.
//! These checks run in the same call path as the tenant-scoped fetch of
//! the target user, so there is no window between the isolation check and
//! the invariant check.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::user::{Role, User};

/// The admin-mutating operations subject to protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminMutation {
    ChangeRole,
    ChangeStatus,
    Delete,
}

/// Rejects mutations that would let one privileged account alter another.
///
/// Role and status changes on an admin target are allowed only when the
/// actor is the target itself. Deleting an admin is never allowed, for
/// any actor — including holders of the super-admin key.
pub fn check_admin_protection(
    actor_id: Uuid,
    target: &User,
    mutation: AdminMutation,
) -> CoreResult<()> {
    if target.role != Role::Admin {
        return Ok(());
    }

    match mutation {
        AdminMutation::ChangeRole | AdminMutation::ChangeStatus => {
            if target.id == actor_id {
                Ok(())
            } else {
                Err(CoreError::Forbidden {
                    reason: "cannot modify another admin account".into(),
                })
            }
        }
        AdminMutation::Delete => Err(CoreError::Forbidden {
            reason: "admin accounts cannot be deleted".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::user::UserStatus;

    fn user(id: Uuid, role: Role) -> User {
        User {
            id,
            tenant_id: Uuid::new_v4(),
            email: "a@example.com".into(),
            password_hash: None,
            oauth_subject: None,
            role,
            status: UserStatus::Active,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn non_admin_target_is_unprotected() {
        let actor = Uuid::new_v4();
        let target = user(Uuid::new_v4(), Role::User);
        for m in [
            AdminMutation::ChangeRole,
            AdminMutation::ChangeStatus,
            AdminMutation::Delete,
        ] {
            assert!(check_admin_protection(actor, &target, m).is_ok());
        }
    }

    #[test]
    fn admin_cannot_alter_peer_admin() {
        let actor = Uuid::new_v4();
        let target = user(Uuid::new_v4(), Role::Admin);
        assert!(check_admin_protection(actor, &target, AdminMutation::ChangeRole).is_err());
        assert!(check_admin_protection(actor, &target, AdminMutation::ChangeStatus).is_err());
    }

    #[test]
    fn admin_may_alter_self() {
        let id = Uuid::new_v4();
        let target = user(id, Role::Admin);
        assert!(check_admin_protection(id, &target, AdminMutation::ChangeRole).is_ok());
        assert!(check_admin_protection(id, &target, AdminMutation::ChangeStatus).is_ok());
    }

    #[test]
    fn admin_delete_rejected_even_for_self() {
        let id = Uuid::new_v4();
        let target = user(id, Role::Admin);
        assert!(check_admin_protection(id, &target, AdminMutation::Delete).is_err());
    }
}
