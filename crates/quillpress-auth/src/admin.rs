//! Admin mutations on user accounts, with protection invariants.
//!
//! The tenant-scoped fetch of the target and the admin-protection check
//! run in the same call as the mutation, so no interleaving can slip a
//! forbidden write between the checks.

use quillpress_core::error::CoreResult;
use quillpress_core::guard::{AdminMutation, check_admin_protection};
use quillpress_core::models::user::{Role, UpdateUser, User, UserStatus};
use quillpress_core::repository::UserRepository;
use uuid::Uuid;

use crate::identity::Principal;

pub struct AdminService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> AdminService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Change a user's role. Another admin's role cannot be changed; an
    /// admin may change their own.
    pub async fn change_role(
        &self,
        actor: &Principal,
        target_id: Uuid,
        role: Role,
    ) -> CoreResult<User> {
        let target = self.users.get_by_id(actor.tenant_id, target_id).await?;
        check_admin_protection(actor.user_id, &target, AdminMutation::ChangeRole)?;

        self.users
            .update(
                actor.tenant_id,
                target_id,
                UpdateUser {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await
    }

    /// Suspend or reactivate a user, under the same peer-admin rule as
    /// role changes.
    pub async fn change_status(
        &self,
        actor: &Principal,
        target_id: Uuid,
        status: UserStatus,
    ) -> CoreResult<User> {
        let target = self.users.get_by_id(actor.tenant_id, target_id).await?;
        check_admin_protection(actor.user_id, &target, AdminMutation::ChangeStatus)?;

        self.users
            .update(
                actor.tenant_id,
                target_id,
                UpdateUser {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
    }

    /// Delete a user. Admin accounts can never be deleted through this
    /// path, regardless of actor.
    pub async fn delete_user(&self, actor: &Principal, target_id: Uuid) -> CoreResult<()> {
        let target = self.users.get_by_id(actor.tenant_id, target_id).await?;
        check_admin_protection(actor.user_id, &target, AdminMutation::Delete)?;

        self.users.delete(actor.tenant_id, target_id).await
    }
}
