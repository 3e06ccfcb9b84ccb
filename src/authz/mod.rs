//! Authorization rules.
//!
//! Every protected action has one function here. Each takes plain facts
//! (role, tenant flags, ownership) and returns a [`Decision`]; none of them
//! touch the store, so callers resolve the facts first and handlers and
//! services can both evaluate the same rule.
//!
//! Media deletion has no rule here: ownership is part of the lookup
//! (`find_owned_media`), so a foreign id is simply not found.

use uuid::Uuid;

use crate::error::ApiError;
use crate::types::Role;

/// The acting identity as seen by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Uuid,
    pub tenant_is_super_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    SuperAdminTenantRequired,
    ForeignTenant,
    AdminRequired,
    NotProjectManager,
    SelfDeletion,
    AdminTarget,
}

impl Denial {
    pub fn message(&self) -> &'static str {
        match self {
            Denial::SuperAdminTenantRequired => "Access denied. Super admin privileges required",
            Denial::ForeignTenant => "Not authorized to update this tenant",
            Denial::AdminRequired => "Access denied. Admin privileges required",
            Denial::NotProjectManager => "Unauthorized action",
            Denial::SelfDeletion => "Cannot delete yourself",
            Denial::AdminTarget => "Cannot delete admin users",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    fn allow_if(condition: bool, denial: Denial) -> Self {
        if condition {
            Decision::Allow
        } else {
            Decision::Deny(denial)
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Turn a denial into a 403, logging the action that was refused.
    pub fn require(self, action: &str) -> Result<(), ApiError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(denial) => {
                tracing::warn!("Authorization denied for {}: {:?}", action, denial);
                Err(ApiError::forbidden(denial.message()))
            }
        }
    }
}

/// Tenant creation, listing and status changes.
pub fn manage_tenants(actor: &Actor) -> Decision {
    Decision::allow_if(actor.tenant_is_super_admin, Denial::SuperAdminTenantRequired)
}

/// Settings of `target_tenant` may only be changed by an admin of that same
/// tenant. A super_admin of another tenant is refused as well.
pub fn update_tenant_settings(actor: &Actor, target_tenant: Uuid) -> Decision {
    Decision::allow_if(
        actor.role.is_admin() && actor.tenant_id == target_tenant,
        Denial::ForeignTenant,
    )
}

/// Team-member management inside a project: a tenant_admin, or the project's
/// owner whatever their role.
pub fn manage_team_members(role: Role, owns_project: bool) -> Decision {
    Decision::allow_if(role == Role::TenantAdmin || owns_project, Denial::NotProjectManager)
}

/// Checked before the target is looked up.
pub fn delete_team_member(actor_id: Uuid, target_id: Uuid) -> Decision {
    Decision::allow_if(actor_id != target_id, Denial::SelfDeletion)
}

/// Admin accounts are never removed through the team-member path.
pub fn deletable_target(target_role: Role) -> Decision {
    Decision::allow_if(!target_role.is_admin(), Denial::AdminTarget)
}

/// Admin-only user management and template mutations.
pub fn require_admin(role: Role) -> Decision {
    Decision::allow_if(role.is_admin(), Denial::AdminRequired)
}
