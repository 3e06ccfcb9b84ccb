use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{hash_password, issue_token, verify_password, AuthError};
use crate::authz::{self, Actor};
use crate::config::SecurityConfig;
use crate::database::models::{normalize_email, NewUser, TenantView, User, UserView};
use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::types::Role;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    pub tenant_domain: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: UserView,
    pub tenant: TenantView,
}

pub struct UserService {
    store: Arc<dyn Store>,
    security: SecurityConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), ApiError> {
        if self.store.email_exists(email).await? {
            return Err(ApiError::conflict("User with this email already exists"));
        }
        Ok(())
    }

    /// Self-service sign-up into the tenant owning `tenant_domain`.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<UserView> {
        let tenant = self
            .store
            .find_tenant_by_domain(&request.tenant_domain)
            .await?
            .filter(|t| t.is_active)
            .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

        self.ensure_email_free(&request.email).await?;

        let user = User::new(NewUser {
            tenant_id: tenant.id,
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password, self.security.bcrypt_cost)?,
            role: Role::User,
            first_name: request.first_name,
            last_name: request.last_name,
            mobile_number: request.mobile_number.unwrap_or_default(),
            project_id: None,
            permissions: Vec::new(),
        });

        self.store.insert_user(&user).await?;
        tracing::info!("Registered user {} in tenant {}", user.id, tenant.domain);

        Ok(ApiResponse::created("User registered successfully", user.sanitized()))
    }

    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        let user = self
            .store
            .find_user_by_email(&normalize_email(&request.email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            tracing::warn!("Failed login for {}", user.email);
            return Err(AuthError::InvalidCredentials.into());
        }

        if !user.is_active {
            return Err(ApiError::forbidden("Account is inactive"));
        }

        let tenant_active = self
            .store
            .find_tenant(user.tenant_id)
            .await?
            .map(|t| t.is_active)
            .unwrap_or(false);
        if !tenant_active {
            return Err(ApiError::forbidden("Tenant is inactive"));
        }

        let token = issue_token(user.id, user.tenant_id, user.role, &self.security)?;
        tracing::info!("User {} logged in", user.id);

        Ok(ApiResponse::success(
            "Login successful",
            LoginResponse {
                token,
                user: user.sanitized(),
            },
        ))
    }

    pub fn me(&self, ctx: &RequestContext) -> ApiResult<Profile> {
        Ok(ApiResponse::success(
            "Profile retrieved successfully",
            Profile {
                user: ctx.user.sanitized(),
                tenant: ctx.tenant.view(),
            },
        ))
    }

    pub async fn update_profile(&self, mut user: User, request: UpdateProfileRequest) -> ApiResult<UserView> {
        if let Some(username) = request.username.as_deref() {
            if self
                .store
                .identity_taken_in_tenant(user.tenant_id, None, Some(username), Some(user.id))
                .await?
            {
                return Err(ApiError::conflict("Username already taken"));
            }
            user.username = username.trim().to_string();
        }
        if let Some(password) = request.password {
            user.password_hash = hash_password(&password, self.security.bcrypt_cost)?;
        }
        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(mobile_number) = request.mobile_number {
            user.mobile_number = mobile_number.trim().to_string();
        }
        user.updated_at = chrono::Utc::now();

        if !self.store.update_user(&user).await? {
            return Err(ApiError::not_found("User not found"));
        }

        tracing::info!("User {} updated their profile", user.id);
        Ok(ApiResponse::success("Profile updated successfully", user.sanitized()))
    }

    /// Admin-created account in the admin's own tenant.
    pub async fn create_user(&self, actor: &Actor, request: CreateUserRequest) -> ApiResult<UserView> {
        authz::require_admin(actor.role).require("user create")?;

        let role = request.role.unwrap_or(Role::User);
        if !matches!(role, Role::User | Role::TenantAdmin) {
            return Err(ApiError::bad_request("Role must be user or tenant_admin"));
        }

        self.ensure_email_free(&request.email).await?;

        let user = User::new(NewUser {
            tenant_id: actor.tenant_id,
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password, self.security.bcrypt_cost)?,
            role,
            first_name: request.first_name,
            last_name: request.last_name,
            mobile_number: request.mobile_number.unwrap_or_default(),
            project_id: None,
            permissions: Vec::new(),
        });

        self.store.insert_user(&user).await?;
        tracing::info!("Admin {} created {} {}", actor.user_id, user.role, user.id);

        Ok(ApiResponse::created("User created successfully", user.sanitized()))
    }

    pub async fn list_users(&self, actor: &Actor) -> ApiResult<Vec<UserView>> {
        authz::require_admin(actor.role).require("user list")?;

        let users = self.store.list_users_in_tenant(actor.tenant_id).await?;
        Ok(ApiResponse::success(
            "Users retrieved successfully",
            users.iter().map(User::sanitized).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_jwt;
    use crate::config::AppConfig;
    use crate::database::models::Tenant;
    use crate::database::{MemoryStore, TenantStore};
    use axum::http::StatusCode;

    async fn setup() -> (UserService, MemoryStore, Tenant) {
        let store = MemoryStore::new();
        let tenant = Tenant::new("acme", "acme.io", "Acme", "");
        store.insert_tenant(tenant.clone()).await.unwrap();
        let service = UserService::new(Arc::new(store.clone()), AppConfig::test().security);
        (service, store, tenant)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "grace".into(),
            email: email.into(),
            password: "cobol123".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            mobile_number: None,
            tenant_domain: "ACME.io".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, _, tenant) = setup().await;
        let created = service.register(register_request("grace@acme.io")).await.unwrap();
        assert_eq!(created.status, StatusCode::CREATED);

        let login = service
            .login(LoginRequest {
                email: "Grace@Acme.io".into(),
                password: "cobol123".into(),
            })
            .await
            .unwrap()
            .data
            .unwrap();
        let claims = verify_jwt(&login.token, "test-secret").unwrap();
        assert_eq!(claims.tenant_id, tenant.id);
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn register_rejects_taken_email_and_unknown_tenant() {
        let (service, _, _) = setup().await;
        service.register(register_request("grace@acme.io")).await.unwrap();

        let err = service.register(register_request("GRACE@acme.io")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let mut request = register_request("new@acme.io");
        request.tenant_domain = "nowhere.io".into();
        let err = service.register(request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_password_and_inactive_tenant() {
        let (service, store, tenant) = setup().await;
        service.register(register_request("grace@acme.io")).await.unwrap();

        let err = service
            .login(LoginRequest {
                email: "grace@acme.io".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        store.set_tenant_active(tenant.id, false).await.unwrap();
        let err = service
            .login(LoginRequest {
                email: "grace@acme.io".into(),
                password: "cobol123".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::forbidden("Tenant is inactive"));
    }

    #[tokio::test]
    async fn only_admins_create_users() {
        let (service, _, tenant) = setup().await;
        let actor = Actor {
            user_id: uuid::Uuid::new_v4(),
            role: Role::User,
            tenant_id: tenant.id,
            tenant_is_super_admin: false,
        };
        let request = CreateUserRequest {
            username: "linus".into(),
            email: "linus@acme.io".into(),
            password: "kernel1".into(),
            first_name: "Linus".into(),
            last_name: "T".into(),
            mobile_number: None,
            role: Some(Role::TenantAdmin),
        };

        let err = service.create_user(&actor, request.clone()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let admin = Actor {
            role: Role::TenantAdmin,
            ..actor
        };
        let created = service.create_user(&admin, request).await.unwrap().data.unwrap();
        assert_eq!(created.role, Role::TenantAdmin);
        assert_eq!(created.tenant_id, tenant.id);

        let listed = service.list_users(&admin).await.unwrap().data.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
