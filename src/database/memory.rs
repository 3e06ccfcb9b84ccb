use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{normalize_email, Media, Project, Tenant, User};
use super::store::{MediaStore, ProjectStore, Store, StoreError, StoreResult, TenantStore, UserStore};
use crate::types::Role;

#[derive(Default)]
struct Collections {
    tenants: HashMap<Uuid, Tenant>,
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    media: HashMap<Uuid, Media>,
}

impl Collections {
    fn check_tenant_unique(&self, tenant: &Tenant) -> StoreResult<()> {
        for other in self.tenants.values().filter(|t| t.id != tenant.id) {
            if other.name == tenant.name {
                return Err(StoreError::Duplicate("Tenant name".into()));
            }
            if other.domain == tenant.domain {
                return Err(StoreError::Duplicate("Tenant domain".into()));
            }
        }
        Ok(())
    }

    fn check_user_unique(&self, user: &User) -> StoreResult<()> {
        for other in self.users.values().filter(|u| u.id != user.id) {
            if other.email == user.email {
                return Err(StoreError::Duplicate("Email".into()));
            }
            if other.tenant_id == user.tenant_id && other.username == user.username {
                return Err(StoreError::Duplicate("Username".into()));
            }
        }
        Ok(())
    }
}

/// In-process store with the same constraints as the Postgres schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects are created elsewhere in the platform; this seeds one.
    pub async fn insert_project(&self, project: Project) {
        self.inner.write().await.projects.insert(project.id, project);
    }

    pub async fn insert_tenant(&self, tenant: Tenant) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        data.check_tenant_unique(&tenant)?;
        data.tenants.insert(tenant.id, tenant);
        Ok(())
    }

    pub async fn media_count(&self) -> usize {
        self.inner.read().await.media.len()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(self.inner.read().await.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>> {
        let domain = domain.trim().to_ascii_lowercase();
        let data = self.inner.read().await;
        Ok(data.tenants.values().find(|t| t.domain == domain).cloned())
    }

    async fn tenant_name_or_domain_exists(&self, name: &str, domain: &str) -> StoreResult<bool> {
        let domain = domain.trim().to_ascii_lowercase();
        let name = name.trim();
        let data = self.inner.read().await;
        Ok(data.tenants.values().any(|t| t.name == name || t.domain == domain))
    }

    async fn super_admin_tenant_exists(&self) -> StoreResult<bool> {
        Ok(self.inner.read().await.tenants.values().any(|t| t.is_super_admin))
    }

    async fn create_tenant_with_admin(&self, tenant: &Tenant, admin: &User) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        data.check_tenant_unique(tenant)?;
        data.check_user_unique(admin)?;
        data.tenants.insert(tenant.id, tenant.clone());
        data.users.insert(admin.id, admin.clone());
        Ok(())
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let mut tenants: Vec<Tenant> = self.inner.read().await.tenants.values().cloned().collect();
        tenants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tenants)
    }

    async fn set_tenant_active(&self, id: Uuid, is_active: bool) -> StoreResult<Option<Tenant>> {
        let mut data = self.inner.write().await;
        Ok(data.tenants.get_mut(&id).map(|tenant| {
            tenant.is_active = is_active;
            tenant.updated_at = chrono::Utc::now();
            tenant.clone()
        }))
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        if !data.tenants.contains_key(&tenant.id) {
            return Ok(false);
        }
        data.check_tenant_unique(tenant)?;
        data.tenants.insert(tenant.id, tenant.clone());
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let data = self.inner.read().await;
        Ok(data.users.values().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.find_user_by_email(email).await?.is_some())
    }

    async fn identity_taken_in_tenant(
        &self,
        tenant_id: Uuid,
        email: Option<&str>,
        username: Option<&str>,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        let email = email.map(normalize_email);
        let username = username.map(|u| u.trim().to_string());
        let data = self.inner.read().await;
        Ok(data.users.values().any(|u| {
            u.tenant_id == tenant_id
                && Some(u.id) != exclude
                && (email.as_deref() == Some(u.email.as_str())
                    || username.as_deref() == Some(u.username.as_str()))
        }))
    }

    async fn find_user_in_tenant(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.get(&id).filter(|u| u.tenant_id == tenant_id).cloned())
    }

    async fn find_team_member(&self, tenant_id: Uuid, project_id: Uuid, id: Uuid) -> StoreResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data
            .users
            .get(&id)
            .filter(|u| u.tenant_id == tenant_id && u.project_id == Some(project_id) && u.role == Role::TeamMember)
            .cloned())
    }

    async fn list_team_members(&self, tenant_id: Uuid, project_id: Uuid) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        let mut members: Vec<User> = data
            .users
            .values()
            .filter(|u| u.tenant_id == tenant_id && u.project_id == Some(project_id) && u.role == Role::TeamMember)
            .cloned()
            .collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(members)
    }

    async fn list_users_in_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        let mut users: Vec<User> = data.users.values().filter(|u| u.tenant_id == tenant_id).cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut data = self.inner.write().await;
        data.check_user_unique(user)?;
        data.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StoreResult<bool> {
        let mut data = self.inner.write().await;
        if !data.users.contains_key(&user.id) {
            return Ok(false);
        }
        data.check_user_unique(user)?;
        data.users.insert(user.id, user.clone());
        Ok(true)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn insert_media(&self, media: &Media) -> StoreResult<()> {
        self.inner.write().await.media.insert(media.id, media.clone());
        Ok(())
    }

    async fn list_media_for_owner(&self, owner: Uuid) -> StoreResult<Vec<Media>> {
        let data = self.inner.read().await;
        let mut items: Vec<Media> = data.media.values().filter(|m| m.uploaded_by == owner).cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_owned_media(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Media>> {
        let data = self.inner.read().await;
        Ok(data.media.get(&id).filter(|m| m.uploaded_by == owner).cloned())
    }

    async fn delete_media(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.media.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;

    fn user(tenant_id: Uuid, username: &str, email: &str) -> User {
        User::new(NewUser {
            tenant_id,
            username: username.into(),
            email: email.into(),
            password_hash: "x".into(),
            role: Role::User,
            first_name: "F".into(),
            last_name: "L".into(),
            mobile_number: String::new(),
            project_id: None,
            permissions: vec![],
        })
    }

    #[tokio::test]
    async fn email_is_globally_unique() {
        let store = MemoryStore::new();
        store.insert_user(&user(Uuid::new_v4(), "a", "same@example.com")).await.unwrap();
        let err = store
            .insert_user(&user(Uuid::new_v4(), "b", "SAME@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate("Email".into()));
    }

    #[tokio::test]
    async fn username_is_unique_per_tenant_only() {
        let store = MemoryStore::new();
        let t1 = Uuid::new_v4();
        store.insert_user(&user(t1, "sam", "a@example.com")).await.unwrap();
        store.insert_user(&user(Uuid::new_v4(), "sam", "b@example.com")).await.unwrap();
        assert!(store.insert_user(&user(t1, "sam", "c@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn identity_check_excludes_self_and_other_tenants() {
        let store = MemoryStore::new();
        let t1 = Uuid::new_v4();
        let existing = user(t1, "sam", "sam@example.com");
        store.insert_user(&existing).await.unwrap();

        assert!(store.identity_taken_in_tenant(t1, Some("SAM@example.com"), None, None).await.unwrap());
        assert!(store.identity_taken_in_tenant(t1, None, Some("sam"), None).await.unwrap());
        assert!(!store
            .identity_taken_in_tenant(t1, Some("sam@example.com"), Some("sam"), Some(existing.id))
            .await
            .unwrap());
        assert!(!store
            .identity_taken_in_tenant(Uuid::new_v4(), Some("sam@example.com"), Some("sam"), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn owned_media_lookup_filters_by_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let media = Media::new("u".into(), "p".into(), crate::types::MediaKind::Image, 10, owner);
        store.insert_media(&media).await.unwrap();
        assert!(store.find_owned_media(media.id, owner).await.unwrap().is_some());
        assert!(store.find_owned_media(media.id, Uuid::new_v4()).await.unwrap().is_none());
    }
}
