//! Test fixtures shared by unit and integration tests.
//!
//! A [`TestContext`] seeds an in-memory store with a super-admin tenant, a
//! regular tenant with an admin, a project owner, a plain user and one
//! project, and wires them into a router backed by a fake media host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::sync::Mutex;

use crate::auth::{hash_password, issue_token};
use crate::config::AppConfig;
use crate::database::models::{NewUser, Project, Tenant, User};
use crate::database::{MemoryStore, TenantStore, UserStore};
use crate::external::{HostedAsset, MediaHost, UploadFile};
use crate::types::{MediaKind, Role};
use crate::AppState;

/// Password of every seeded account.
pub const PASSWORD: &str = "secret1";

/// Media host that keeps nothing and remembers what it was asked to do.
#[derive(Default)]
pub struct FakeMediaHost {
    uploads: AtomicUsize,
    destroyed: Mutex<Vec<String>>,
}

impl FakeMediaHost {
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub async fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().await.clone()
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, file: &UploadFile, kind: MediaKind) -> anyhow::Result<HostedAsset> {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(HostedAsset {
            url: format!("https://media.test/{}/{}", kind.as_str(), file.file_name),
            public_id: format!("tenanthub/{}-{}", n, file.file_name),
            size: file.bytes.len() as i64,
        })
    }

    async fn destroy(&self, public_id: &str, _kind: MediaKind) -> anyhow::Result<()> {
        self.destroyed.lock().await.push(public_id.to_string());
        Ok(())
    }
}

/// A seeded user and a valid bearer token for it.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub token: String,
}

impl Account {
    pub fn id(&self) -> uuid::Uuid {
        self.user.id
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub struct TestContext {
    pub config: AppConfig,
    pub store: MemoryStore,
    pub host: Arc<FakeMediaHost>,
    /// Super-admin tenant
    pub platform: Tenant,
    /// Regular tenant
    pub acme: Tenant,
    /// super_admin of `platform`
    pub root: Account,
    /// tenant_admin of `acme`
    pub admin: Account,
    /// user of `acme` owning `project`
    pub owner: Account,
    /// user of `acme` with no project
    pub user: Account,
    pub project: Project,
}

impl TestContext {
    pub async fn new() -> Self {
        let config = AppConfig::test();
        let store = MemoryStore::new();

        let mut platform = Tenant::new("Platform", "platform.test", "Platform", "");
        platform.is_super_admin = true;
        let acme = Tenant::new("Acme", "acme.test", "Acme Inc", "");
        store.insert_tenant(platform.clone()).await.expect("seed platform tenant");
        store.insert_tenant(acme.clone()).await.expect("seed acme tenant");

        let mut ctx = Self {
            root: seed_account(&store, &config, &platform, Role::SuperAdmin, "root").await,
            admin: seed_account(&store, &config, &acme, Role::TenantAdmin, "admin").await,
            owner: seed_account(&store, &config, &acme, Role::User, "owner").await,
            user: seed_account(&store, &config, &acme, Role::User, "user").await,
            project: Project::new(acme.id, uuid::Uuid::nil(), "Launch"),
            host: Arc::new(FakeMediaHost::default()),
            config,
            store,
            platform,
            acme,
        };

        ctx.project.user_id = ctx.owner.id();
        ctx.store.insert_project(ctx.project.clone()).await;
        ctx
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.config.clone(), Arc::new(self.store.clone()), self.host.clone())
    }

    pub fn router(&self) -> Router {
        crate::app(self.state())
    }

    /// Another account in `tenant`.
    pub async fn account(&self, tenant: &Tenant, role: Role, name: &str) -> Account {
        seed_account(&self.store, &self.config, tenant, role, name).await
    }

    /// A token for `user` regardless of its current state in the store.
    pub fn token_for(&self, user: &User) -> String {
        issue_token(user.id, user.tenant_id, user.role, &self.config.security).expect("issue token")
    }

    /// Point a tenant's messaging credentials at `base_url`.
    pub async fn configure_whatsapp(&self, tenant: &Tenant, base_url: &str) {
        let mut tenant = self
            .store
            .find_tenant(tenant.id)
            .await
            .expect("store")
            .expect("tenant exists");
        tenant.whatsapp.account_id = "waba-test".into();
        tenant.whatsapp.access_token = "wa-token".into();
        tenant.whatsapp.base_url = base_url.into();
        tenant.whatsapp.api_version = "v19.0".into();
        self.store.update_tenant(&tenant).await.expect("update tenant");
    }

    pub async fn deactivate_user(&self, account: &Account) {
        let mut user = account.user.clone();
        user.is_active = false;
        self.store.update_user(&user).await.expect("update user");
    }

    pub async fn deactivate_tenant(&self, tenant: &Tenant) {
        self.store
            .set_tenant_active(tenant.id, false)
            .await
            .expect("update tenant");
    }
}

async fn seed_account(store: &MemoryStore, config: &AppConfig, tenant: &Tenant, role: Role, name: &str) -> Account {
    let user = User::new(NewUser {
        tenant_id: tenant.id,
        username: name.to_string(),
        email: format!("{}@{}", name, tenant.domain),
        password_hash: hash_password(PASSWORD, config.security.bcrypt_cost).expect("hash password"),
        role,
        first_name: name.to_string(),
        last_name: "Test".to_string(),
        mobile_number: String::new(),
        project_id: None,
        permissions: Vec::new(),
    });
    store.insert_user(&user).await.expect("seed user");

    let token = issue_token(user.id, user.tenant_id, user.role, &config.security).expect("issue token");
    Account { user, token }
}
