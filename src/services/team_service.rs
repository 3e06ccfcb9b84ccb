use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::authz::{self, Actor};
use crate::database::models::{NewUser, Project, User, UserView};
use crate::database::Store;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Role;

const IDENTITY_CONFLICT_MESSAGE: &str = "Team member with this email or username already exists";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMemberRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// Team members are users with role `team-member` scoped to one project.
///
/// Every operation first resolves the project (404 when missing or in another
/// tenant), then evaluates [`authz::manage_team_members`]; uniqueness and
/// target lookups only run after both pass.
pub struct TeamService {
    store: Arc<dyn Store>,
    bcrypt_cost: u32,
}

impl TeamService {
    pub fn new(store: Arc<dyn Store>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    async fn authorized_project(&self, actor: &Actor, project_id: Uuid, action: &str) -> Result<Project, ApiError> {
        let project = self
            .store
            .find_project(project_id)
            .await?
            .filter(|p| p.tenant_id == actor.tenant_id)
            .ok_or_else(|| ApiError::not_found("Project not found"))?;

        authz::manage_team_members(actor.role, project.user_id == actor.user_id).require(action)?;
        Ok(project)
    }

    async fn member(&self, actor: &Actor, project: &Project, id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_team_member(actor.tenant_id, project.id, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Team member not found"))
    }

    pub async fn create(
        &self,
        actor: &Actor,
        project_id: Uuid,
        request: CreateTeamMemberRequest,
    ) -> ApiResult<UserView> {
        let project = self.authorized_project(actor, project_id, "team member create").await?;

        if self
            .store
            .identity_taken_in_tenant(actor.tenant_id, Some(&request.email), Some(&request.username), None)
            .await?
        {
            return Err(ApiError::conflict(IDENTITY_CONFLICT_MESSAGE));
        }

        let member = User::new(NewUser {
            tenant_id: actor.tenant_id,
            username: request.username,
            email: request.email,
            password_hash: hash_password(&request.password, self.bcrypt_cost)?,
            role: Role::TeamMember,
            first_name: request.first_name,
            last_name: request.last_name,
            mobile_number: request.mobile_number.unwrap_or_default(),
            project_id: Some(project.id),
            permissions: request.permissions,
        });

        self.store.insert_user(&member).await?;
        tracing::info!("Team member {} added to project {} by {}", member.id, project.id, actor.user_id);

        Ok(ApiResponse::created("Team member created successfully", member.sanitized()))
    }

    pub async fn list(&self, actor: &Actor, project_id: Uuid) -> ApiResult<Vec<UserView>> {
        let project = self.authorized_project(actor, project_id, "team member list").await?;

        let members = self.store.list_team_members(actor.tenant_id, project.id).await?;
        Ok(ApiResponse::success(
            "Team members retrieved successfully",
            members.iter().map(User::sanitized).collect(),
        ))
    }

    pub async fn get(&self, actor: &Actor, project_id: Uuid, id: Uuid) -> ApiResult<UserView> {
        let project = self.authorized_project(actor, project_id, "team member get").await?;

        let member = self.member(actor, &project, id).await?;
        Ok(ApiResponse::success("Team member retrieved successfully", member.sanitized()))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        project_id: Uuid,
        id: Uuid,
        request: UpdateTeamMemberRequest,
    ) -> ApiResult<UserView> {
        let project = self.authorized_project(actor, project_id, "team member update").await?;
        let mut member = self.member(actor, &project, id).await?;

        if (request.email.is_some() || request.username.is_some())
            && self
                .store
                .identity_taken_in_tenant(
                    actor.tenant_id,
                    request.email.as_deref(),
                    request.username.as_deref(),
                    Some(member.id),
                )
                .await?
        {
            return Err(ApiError::conflict(IDENTITY_CONFLICT_MESSAGE));
        }

        if let Some(username) = request.username {
            member.username = username.trim().to_string();
        }
        if let Some(email) = request.email {
            member.email = crate::database::models::normalize_email(&email);
        }
        if let Some(password) = request.password {
            member.password_hash = hash_password(&password, self.bcrypt_cost)?;
        }
        if let Some(first_name) = request.first_name {
            member.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            member.last_name = last_name.trim().to_string();
        }
        if let Some(mobile_number) = request.mobile_number {
            member.mobile_number = mobile_number.trim().to_string();
        }
        if let Some(permissions) = request.permissions {
            member.permissions = permissions;
        }
        if let Some(is_active) = request.is_active {
            member.is_active = is_active;
        }
        member.updated_at = chrono::Utc::now();

        if !self.store.update_user(&member).await? {
            return Err(ApiError::not_found("Team member not found"));
        }

        tracing::info!("Team member {} updated by {}", member.id, actor.user_id);
        Ok(ApiResponse::success("Team member updated successfully", member.sanitized()))
    }

    pub async fn delete(&self, actor: &Actor, project_id: Uuid, id: Uuid) -> ApiResult<()> {
        let project = self.authorized_project(actor, project_id, "team member delete").await?;

        authz::delete_team_member(actor.user_id, id).require("team member delete")?;

        let target = self
            .store
            .find_user_in_tenant(actor.tenant_id, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Team member not found"))?;

        authz::deletable_target(target.role).require("team member delete")?;

        if target.role != Role::TeamMember || target.project_id != Some(project.id) {
            return Err(ApiError::not_found("Team member not found"));
        }

        self.store.delete_user(target.id).await?;
        tracing::info!("Team member {} removed from project {} by {}", target.id, project.id, actor.user_id);

        Ok(ApiResponse::message("Team member deleted successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Tenant;
    use crate::database::{MemoryStore, UserStore};
    use axum::http::StatusCode;

    struct Fixture {
        service: TeamService,
        store: MemoryStore,
        tenant: Tenant,
        project: Project,
        owner: Actor,
        admin: Actor,
        outsider: Actor,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let tenant = Tenant::new("acme", "acme.io", "Acme", "");
        store.insert_tenant(tenant.clone()).await.unwrap();

        let actor = |role| Actor {
            user_id: Uuid::new_v4(),
            role,
            tenant_id: tenant.id,
            tenant_is_super_admin: false,
        };
        let owner = actor(Role::User);
        let admin = actor(Role::TenantAdmin);
        let outsider = actor(Role::User);

        let project = Project::new(tenant.id, owner.user_id, "Launch");
        store.insert_project(project.clone()).await;

        Fixture {
            service: TeamService::new(Arc::new(store.clone()), 4),
            store,
            tenant,
            project,
            owner,
            admin,
            outsider,
        }
    }

    fn create_request(username: &str, email: &str) -> CreateTeamMemberRequest {
        CreateTeamMemberRequest {
            username: username.into(),
            email: email.into(),
            password: "secret1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            mobile_number: None,
            permissions: vec!["templates:read".into()],
        }
    }

    #[tokio::test]
    async fn owner_creates_and_fetches_member() {
        let f = fixture().await;
        let created = f
            .service
            .create(&f.owner, f.project.id, create_request("ada", "ada@acme.io"))
            .await
            .unwrap();
        assert_eq!(created.status, StatusCode::CREATED);
        let created = created.data.unwrap();

        let fetched = f.service.get(&f.admin, f.project.id, created.id).await.unwrap().data.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.role, Role::TeamMember);
        assert_eq!(fetched.project_id, Some(f.project.id));
    }

    #[tokio::test]
    async fn missing_project_wins_over_authorization() {
        let f = fixture().await;
        let err = f.service.list(&f.outsider, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, ApiError::not_found("Project not found"));
    }

    #[tokio::test]
    async fn foreign_tenant_project_is_not_found() {
        let f = fixture().await;
        let stranger = Actor {
            tenant_id: Uuid::new_v4(),
            ..f.admin
        };
        let err = f.service.list(&stranger, f.project.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn outsider_is_refused() {
        let f = fixture().await;
        let err = f
            .service
            .create(&f.outsider, f.project.id, create_request("ada", "ada@acme.io"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::forbidden("Unauthorized action"));
    }

    #[tokio::test]
    async fn duplicate_identity_in_tenant_conflicts() {
        let f = fixture().await;
        f.service
            .create(&f.owner, f.project.id, create_request("ada", "ada@acme.io"))
            .await
            .unwrap();
        let err = f
            .service
            .create(&f.owner, f.project.id, create_request("ada", "other@acme.io"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::conflict(IDENTITY_CONFLICT_MESSAGE));
    }

    #[tokio::test]
    async fn update_rehashes_password_and_keeps_role() {
        let f = fixture().await;
        let created = f
            .service
            .create(&f.owner, f.project.id, create_request("ada", "ada@acme.io"))
            .await
            .unwrap()
            .data
            .unwrap();
        let before = f.store.find_user(created.id).await.unwrap().unwrap();

        let updated = f
            .service
            .update(
                &f.owner,
                f.project.id,
                created.id,
                UpdateTeamMemberRequest {
                    first_name: Some("Augusta".into()),
                    password: Some("another1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.username, "ada");

        let after = f.store.find_user(created.id).await.unwrap().unwrap();
        assert_ne!(before.password_hash, after.password_hash);
        assert!(crate::auth::verify_password("another1", &after.password_hash));
    }

    #[tokio::test]
    async fn delete_guards_apply_in_order() {
        let f = fixture().await;

        let err = f.service.delete(&f.admin, f.project.id, f.admin.user_id).await.unwrap_err();
        assert_eq!(err, ApiError::forbidden("Cannot delete yourself"));

        let other_admin = User::new(NewUser {
            tenant_id: f.tenant.id,
            username: "boss".into(),
            email: "boss@acme.io".into(),
            password_hash: "x".into(),
            role: Role::TenantAdmin,
            first_name: "B".into(),
            last_name: "O".into(),
            mobile_number: String::new(),
            project_id: None,
            permissions: vec![],
        });
        f.store.insert_user(&other_admin).await.unwrap();
        let err = f.service.delete(&f.owner, f.project.id, other_admin.id).await.unwrap_err();
        assert_eq!(err, ApiError::forbidden("Cannot delete admin users"));

        let err = f.service.delete(&f.owner, f.project.id, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, ApiError::not_found("Team member not found"));
    }

    #[tokio::test]
    async fn delete_removes_member() {
        let f = fixture().await;
        let created = f
            .service
            .create(&f.owner, f.project.id, create_request("ada", "ada@acme.io"))
            .await
            .unwrap()
            .data
            .unwrap();
        f.service.delete(&f.owner, f.project.id, created.id).await.unwrap();
        assert!(f.store.find_user(created.id).await.unwrap().is_none());
    }
}
