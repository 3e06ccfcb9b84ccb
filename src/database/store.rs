//! Document store interface.
//!
//! Services only talk to these traits. `PgStore` backs them with Postgres,
//! `MemoryStore` with in-process maps for tests and local runs. Both enforce
//! the same uniqueness constraints: tenant name, tenant domain, user email
//! (global, lowercased) and username within a tenant.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Media, Project, Tenant, User};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Unique constraint violation; carries a human label of what collided.
    #[error("{0} already exists")]
    Duplicate(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>>;

    async fn find_tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>>;

    async fn tenant_name_or_domain_exists(&self, name: &str, domain: &str) -> StoreResult<bool>;

    async fn super_admin_tenant_exists(&self) -> StoreResult<bool>;

    /// Writes the tenant and its first admin together; neither is stored if
    /// either write fails.
    async fn create_tenant_with_admin(&self, tenant: &Tenant, admin: &User) -> StoreResult<()>;

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;

    async fn set_tenant_active(&self, id: Uuid, is_active: bool) -> StoreResult<Option<Tenant>>;

    /// Replace the stored settings of an existing tenant. Returns false when
    /// the tenant does not exist.
    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    /// True when some user of `tenant_id` other than `exclude` has the given
    /// email OR the given username.
    async fn identity_taken_in_tenant(
        &self,
        tenant_id: Uuid,
        email: Option<&str>,
        username: Option<&str>,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool>;

    async fn find_user_in_tenant(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_team_member(&self, tenant_id: Uuid, project_id: Uuid, id: Uuid) -> StoreResult<Option<User>>;

    async fn list_team_members(&self, tenant_id: Uuid, project_id: Uuid) -> StoreResult<Vec<User>>;

    async fn list_users_in_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<User>>;

    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Returns false when the user does not exist.
    async fn update_user(&self, user: &User) -> StoreResult<bool>;

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>>;
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert_media(&self, media: &Media) -> StoreResult<()>;

    /// Newest first
    async fn list_media_for_owner(&self, owner: Uuid) -> StoreResult<Vec<Media>>;

    async fn find_owned_media(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Media>>;

    async fn delete_media(&self, id: Uuid) -> StoreResult<bool>;
}

/// The full store as held by the application state.
#[async_trait]
pub trait Store: TenantStore + UserStore + ProjectStore + MediaStore {
    async fn ping(&self) -> StoreResult<()>;
}

