use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use super::auth::AuthClaims;
use crate::authz::Actor;
use crate::database::models::{Tenant, User};
use crate::error::ApiError;
use crate::AppState;

/// The authenticated user and their tenant, loaded fresh for each request.
///
/// Taking this as a handler argument is what makes a route require a live
/// account: the user must still exist, be active, and belong to an active
/// tenant matching the token.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub user: User,
    pub tenant: Tenant,
}

impl RequestContext {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user.id,
            role: self.user.role,
            tenant_id: self.user.tenant_id,
            tenant_is_super_admin: self.tenant.is_super_admin,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<AuthClaims>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user = state.store.find_user(claims.user_id).await?.ok_or_else(|| {
            tracing::warn!("Token for unknown user {}", claims.user_id);
            ApiError::unauthorized("User not found")
        })?;

        if user.tenant_id != claims.tenant_id {
            tracing::warn!(
                "Token tenant {} does not match user {} tenant {}",
                claims.tenant_id,
                user.id,
                user.tenant_id
            );
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }

        if !user.is_active {
            tracing::warn!("Inactive user {} rejected", user.id);
            return Err(ApiError::forbidden("Account is inactive"));
        }

        let tenant = state
            .store
            .find_tenant(user.tenant_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| {
                tracing::warn!("User {} belongs to missing or inactive tenant {}", user.id, user.tenant_id);
                ApiError::forbidden("Tenant is inactive")
            })?;

        tracing::debug!("Resolved user {} ({}) in tenant {}", user.id, user.role, tenant.domain);

        Ok(Self { user, tenant })
    }
}
