use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::authz::{self, Actor};
use crate::database::models::{NewUser, Tenant, TenantSettingsPatch, TenantView, User, UserView};
use crate::database::{Store, StoreError};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;

pub const TENANT_CONFLICT_MESSAGE: &str = "Tenant with this name or domain already exists";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub website_name: Option<String>,
    #[serde(default)]
    pub favicon: Option<String>,
    pub admin_email: String,
    pub admin_password: String,
    #[serde(default)]
    pub admin_username: Option<String>,
    #[serde(default)]
    pub admin_first_name: Option<String>,
    #[serde(default)]
    pub admin_last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedTenant {
    pub tenant: TenantView,
    pub admin: UserView,
}

pub struct TenantService {
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
}

impl TenantService {
    pub fn new(store: Arc<dyn Store>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    /// Create a tenant together with its first tenant_admin.
    pub async fn create_tenant(&self, actor: &Actor, request: CreateTenantRequest) -> ApiResult<CreatedTenant> {
        authz::manage_tenants(actor).require("tenant create")?;

        let (tenant, admin) = self.provision(request, false).await?;
        tracing::info!("Created tenant '{}' ({}) with admin {}", tenant.name, tenant.domain, admin.email);

        Ok(ApiResponse::created(
            "Tenant created successfully",
            CreatedTenant {
                tenant: tenant.view(),
                admin: admin.sanitized(),
            },
        ))
    }

    /// Create the super-admin tenant. Refused once one exists.
    pub async fn bootstrap(&self, request: CreateTenantRequest) -> ApiResult<CreatedTenant> {
        if self.store.super_admin_tenant_exists().await? {
            return Err(ApiError::conflict("A super admin tenant already exists"));
        }

        let (tenant, admin) = self.provision(request, true).await?;
        tracing::info!("Bootstrapped super admin tenant '{}'", tenant.name);

        Ok(ApiResponse::created(
            "Super admin tenant created",
            CreatedTenant {
                tenant: tenant.view(),
                admin: admin.sanitized(),
            },
        ))
    }

    async fn provision(&self, request: CreateTenantRequest, super_admin: bool) -> Result<(Tenant, User), ApiError> {
        if self
            .store
            .tenant_name_or_domain_exists(&request.name, &request.domain)
            .await?
        {
            return Err(ApiError::conflict(TENANT_CONFLICT_MESSAGE));
        }

        if self.store.email_exists(&request.admin_email).await? {
            return Err(ApiError::conflict("User with this email already exists"));
        }

        let mut tenant = Tenant::new(
            &request.name,
            &request.domain,
            request.website_name.as_deref().unwrap_or(&request.name),
            request.favicon.as_deref().unwrap_or_default(),
        );
        tenant.is_super_admin = super_admin;

        let username = request
            .admin_username
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_username(&request.admin_email));

        let admin = User::new(NewUser {
            tenant_id: tenant.id,
            username,
            email: request.admin_email,
            password_hash: hash_password(&request.admin_password, self.bcrypt_cost)?,
            role: if super_admin { Role::SuperAdmin } else { Role::TenantAdmin },
            first_name: request.admin_first_name.unwrap_or_else(|| "Admin".to_string()),
            last_name: request.admin_last_name.unwrap_or_default(),
            mobile_number: String::new(),
            project_id: None,
            permissions: Vec::new(),
        });

        match self.store.create_tenant_with_admin(&tenant, &admin).await {
            Ok(()) => Ok((tenant, admin)),
            // Lost a race with a concurrent create
            Err(StoreError::Duplicate(what)) if what.starts_with("Tenant") => {
                Err(ApiError::conflict(TENANT_CONFLICT_MESSAGE))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_tenants(&self, actor: &Actor) -> ApiResult<Vec<TenantView>> {
        authz::manage_tenants(actor).require("tenant list")?;

        let tenants = self.store.list_tenants().await?;
        Ok(ApiResponse::success(
            "Tenants retrieved successfully",
            tenants.iter().map(Tenant::view).collect(),
        ))
    }

    /// Setting the flag it already has is a no-op that still answers 200.
    pub async fn set_status(&self, actor: &Actor, tenant_id: Uuid, is_active: bool) -> ApiResult<TenantView> {
        authz::manage_tenants(actor).require("tenant status")?;

        let tenant = self
            .store
            .set_tenant_active(tenant_id, is_active)
            .await?
            .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

        tracing::info!("Tenant {} is_active set to {}", tenant.id, is_active);
        Ok(ApiResponse::success("Tenant status updated successfully", tenant.view()))
    }

    pub async fn update_settings(
        &self,
        actor: &Actor,
        tenant_id: Uuid,
        patch: TenantSettingsPatch,
    ) -> ApiResult<TenantView> {
        authz::update_tenant_settings(actor, tenant_id).require("tenant settings")?;

        let mut tenant = self
            .store
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

        patch.apply(&mut tenant);

        if !self.store.update_tenant(&tenant).await? {
            return Err(ApiError::not_found("Tenant not found"));
        }

        tracing::info!("Updated settings of tenant {}", tenant.id);
        Ok(ApiResponse::success("Tenant settings updated successfully", tenant.view()))
    }
}

/// Local part of the e-mail, used when no admin username is given. Keeps
/// only characters a user could later set through their profile.
fn default_username(email: &str) -> String {
    let username: String = email
        .split('@')
        .next()
        .unwrap_or(email)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(100)
        .collect();

    if username.is_empty() {
        "admin".to_string()
    } else {
        username
    }
}
