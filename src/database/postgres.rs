use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::models::{normalize_email, Media, Project, Tenant, User, WhatsAppCredentials};
use super::store::{MediaStore, ProjectStore, Store, StoreError, StoreResult, TenantStore, UserStore};
use crate::config::DatabaseConfig;

const TENANT_COLUMNS: &str = "id, name, domain, website_name, favicon, is_active, is_super_admin, \
     wa_account_id, wa_access_token, wa_app_id, wa_base_url, wa_api_version, created_at, updated_at";

const USER_COLUMNS: &str = "id, tenant_id, username, email, password_hash, role, first_name, last_name, \
     mobile_number, project_id, permissions, is_active, created_at, updated_at";

const MEDIA_COLUMNS: &str = "id, url, public_id, kind, size, uploaded_by, created_at, updated_at";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                let label = match db.constraint() {
                    Some("tenants_name_key") => "Tenant name",
                    Some("tenants_domain_key") => "Tenant domain",
                    Some("users_email_key") => "Email",
                    Some("users_tenant_username_key") => "Username",
                    _ => "Record",
                };
                StoreError::Duplicate(label.to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

#[derive(FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    domain: String,
    website_name: String,
    favicon: String,
    is_active: bool,
    is_super_admin: bool,
    wa_account_id: String,
    wa_access_token: String,
    wa_app_id: String,
    wa_base_url: String,
    wa_api_version: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(r: TenantRow) -> Self {
        Tenant {
            id: r.id,
            name: r.name,
            domain: r.domain,
            website_name: r.website_name,
            favicon: r.favicon,
            is_active: r.is_active,
            is_super_admin: r.is_super_admin,
            whatsapp: WhatsAppCredentials {
                account_id: r.wa_account_id,
                access_token: r.wa_access_token,
                app_id: r.wa_app_id,
                base_url: r.wa_base_url,
                api_version: r.wa_api_version,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    tenant_id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    first_name: String,
    last_name: String,
    mobile_number: String,
    project_id: Option<Uuid>,
    permissions: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: r.id,
            tenant_id: r.tenant_id,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            role: r.role.parse().map_err(StoreError::Backend)?,
            first_name: r.first_name,
            last_name: r.last_name,
            mobile_number: r.mobile_number,
            project_id: r.project_id,
            permissions: r.permissions,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct MediaRow {
    id: Uuid,
    url: String,
    public_id: String,
    kind: String,
    size: i64,
    uploaded_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MediaRow> for Media {
    type Error = StoreError;

    fn try_from(r: MediaRow) -> Result<Self, Self::Error> {
        Ok(Media {
            id: r.id,
            url: r.url,
            public_id: r.public_id,
            kind: r.kind.parse().map_err(StoreError::Backend)?,
            size: r.size,
            uploaded_by: r.uploaded_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ProjectRow {
    id: Uuid,
    tenant_id: Uuid,
    user_id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

fn users_from_rows(rows: Vec<UserRow>) -> StoreResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn insert_user_with<'e, E>(executor: E, user: &User) -> StoreResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, tenant_id, username, email, password_hash, role, first_name, last_name,
                           mobile_number, project_id, permissions, is_active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(user.id)
    .bind(user.tenant_id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.mobile_number)
    .bind(user.project_id)
    .bind(&user.permissions)
    .bind(user.is_active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl TenantStore for PgStore {
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let row: Option<TenantRow> = sqlx::query_as(&format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Tenant::from))
    }

    async fn find_tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {} FROM tenants WHERE domain = $1", TENANT_COLUMNS))
                .bind(domain.trim().to_ascii_lowercase())
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Tenant::from))
    }

    async fn tenant_name_or_domain_exists(&self, name: &str, domain: &str) -> StoreResult<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants WHERE name = $1 OR domain = $2")
            .bind(name.trim())
            .bind(domain.trim().to_ascii_lowercase())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }

    async fn super_admin_tenant_exists(&self) -> StoreResult<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants WHERE is_super_admin")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }

    async fn create_tenant_with_admin(&self, tenant: &Tenant, admin: &User) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tenants (id, name, domain, website_name, favicon, is_active, is_super_admin,
                                 wa_account_id, wa_access_token, wa_app_id, wa_base_url, wa_api_version,
                                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .bind(&tenant.website_name)
        .bind(&tenant.favicon)
        .bind(tenant.is_active)
        .bind(tenant.is_super_admin)
        .bind(&tenant.whatsapp.account_id)
        .bind(&tenant.whatsapp.access_token)
        .bind(&tenant.whatsapp.app_id)
        .bind(&tenant.whatsapp.base_url)
        .bind(&tenant.whatsapp.api_version)
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_user_with(&mut *tx, admin).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let rows: Vec<TenantRow> =
            sqlx::query_as(&format!("SELECT {} FROM tenants ORDER BY created_at DESC", TENANT_COLUMNS))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    async fn set_tenant_active(&self, id: Uuid, is_active: bool) -> StoreResult<Option<Tenant>> {
        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "UPDATE tenants SET is_active = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            TENANT_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Tenant::from))
    }

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tenants SET
                name = $2, domain = $3, website_name = $4, favicon = $5, is_active = $6,
                wa_account_id = $7, wa_access_token = $8, wa_app_id = $9, wa_base_url = $10,
                wa_api_version = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.domain)
        .bind(&tenant.website_name)
        .bind(&tenant.favicon)
        .bind(tenant.is_active)
        .bind(&tenant.whatsapp.account_id)
        .bind(&tenant.whatsapp.access_token)
        .bind(&tenant.whatsapp.app_id)
        .bind(&tenant.whatsapp.base_url)
        .bind(&tenant.whatsapp.api_version)
        .bind(tenant.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }

    async fn identity_taken_in_tenant(
        &self,
        tenant_id: Uuid,
        email: Option<&str>,
        username: Option<&str>,
        exclude: Option<Uuid>,
    ) -> StoreResult<bool> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE tenant_id = $1
              AND ($4::uuid IS NULL OR id <> $4)
              AND (email = $2 OR username = $3)
            "#,
        )
        .bind(tenant_id)
        .bind(email.map(normalize_email))
        .bind(username.map(|u| u.trim().to_string()))
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0 > 0)
    }

    async fn find_user_in_tenant(&self, tenant_id: Uuid, id: Uuid) -> StoreResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1 AND tenant_id = $2", USER_COLUMNS))
                .bind(id)
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_team_member(&self, tenant_id: Uuid, project_id: Uuid, id: Uuid) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE id = $1 AND tenant_id = $2 AND project_id = $3 AND role = 'team-member'",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_team_members(&self, tenant_id: Uuid, project_id: Uuid) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE tenant_id = $1 AND project_id = $2 AND role = 'team-member' \
             ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .bind(tenant_id)
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        users_from_rows(rows)
    }

    async fn list_users_in_tenant(&self, tenant_id: Uuid) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE tenant_id = $1 ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        users_from_rows(rows)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        insert_user_with(&self.pool, user).await
    }

    async fn update_user(&self, user: &User) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = $2, email = $3, password_hash = $4, role = $5, first_name = $6,
                last_name = $7, mobile_number = $8, project_id = $9, permissions = $10,
                is_active = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.mobile_number)
        .bind(user.project_id)
        .bind(&user.permissions)
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn find_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let row: Option<ProjectRow> =
            sqlx::query_as("SELECT id, tenant_id, user_id, name, created_at FROM projects WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| Project {
            id: r.id,
            tenant_id: r.tenant_id,
            user_id: r.user_id,
            name: r.name,
            created_at: r.created_at,
        }))
    }
}

#[async_trait]
impl MediaStore for PgStore {
    async fn insert_media(&self, media: &Media) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO media (id, url, public_id, kind, size, uploaded_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(media.id)
        .bind(&media.url)
        .bind(&media.public_id)
        .bind(media.kind.as_str())
        .bind(media.size)
        .bind(media.uploaded_by)
        .bind(media.created_at)
        .bind(media.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_media_for_owner(&self, owner: Uuid) -> StoreResult<Vec<Media>> {
        let rows: Vec<MediaRow> = sqlx::query_as(&format!(
            "SELECT {} FROM media WHERE uploaded_by = $1 ORDER BY created_at DESC",
            MEDIA_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Media::try_from).collect()
    }

    async fn find_owned_media(&self, id: Uuid, owner: Uuid) -> StoreResult<Option<Media>> {
        let row: Option<MediaRow> = sqlx::query_as(&format!(
            "SELECT {} FROM media WHERE id = $1 AND uploaded_by = $2",
            MEDIA_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Media::try_from).transpose()
    }

    async fn delete_media(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
