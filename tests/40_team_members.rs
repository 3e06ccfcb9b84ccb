mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{delete, get, post, put, TestContext};
use tenanthub_api::types::Role;

fn member(username: &str) -> Value {
    json!({
        "username": username,
        "email": format!("{}@acme.test", username),
        "password": "secret1",
        "firstName": "Team",
        "lastName": "Member",
        "permissions": ["templates:read"]
    })
}

fn members_uri(ctx: &TestContext) -> String {
    format!("/api/projects/{}/team-members", ctx.project.id)
}

#[tokio::test]
async fn project_owner_manages_team_members() -> Result<()> {
    let ctx = TestContext::new().await;
    let app = ctx.router();
    let uri = members_uri(&ctx);

    let created = post(&app, &uri, Some(&ctx.owner.token), member("ada")).await?;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["role"], "team-member");
    assert_eq!(created.data()["projectId"], ctx.project.id.to_string());
    assert_eq!(created.data()["permissions"], json!(["templates:read"]));
    assert!(created.data().get("passwordHash").is_none());
    let id = created.data()["id"].as_str().unwrap_or_default().to_string();

    let fetched = get(&app, &format!("{}/{}", uri, id), &ctx.owner.token).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    for key in ["firstName", "lastName", "username", "email", "permissions"] {
        assert_eq!(fetched.data()[key], created.data()[key], "{}", key);
    }
    assert!(fetched.data().get("password").is_none());

    let list = get(&app, &uri, &ctx.owner.token).await?;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.data().as_array().map(Vec::len), Some(1));

    let updated = put(&app, &format!("{}/{}", uri, id), &ctx.owner.token, json!({ "lastName": "Lovelace" })).await?;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["lastName"], "Lovelace");

    let removed = delete(&app, &format!("{}/{}", uri, id), &ctx.owner.token).await?;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.message(), "Team member deleted successfully");

    let gone = get(&app, &format!("{}/{}", uri, id), &ctx.owner.token).await?;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn tenant_admin_manages_any_project() -> Result<()> {
    let ctx = TestContext::new().await;
    let res = post(&ctx.router(), &members_uri(&ctx), Some(&ctx.admin.token), member("bob")).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn other_users_are_refused() -> Result<()> {
    let ctx = TestContext::new().await;
    let app = ctx.router();

    let res = post(&app, &members_uri(&ctx), Some(&ctx.user.token), member("eve")).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.message(), "Unauthorized action");

    let res = get(&app, &members_uri(&ctx), &ctx.user.token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let created = post(&app, &members_uri(&ctx), Some(&ctx.owner.token), member("ada")).await?;
    let id = created.data()["id"].as_str().unwrap_or_default().to_string();
    let res = delete(&app, &format!("{}/{}", members_uri(&ctx), id), &ctx.user.token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.message(), "Unauthorized action");
    Ok(())
}

#[tokio::test]
async fn projects_of_other_tenants_are_invisible() -> Result<()> {
    let ctx = TestContext::new().await;
    let app = ctx.router();

    let res = get(&app, &members_uri(&ctx), &ctx.root.token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), "Project not found");

    let unknown = format!("/api/projects/{}/team-members", uuid::Uuid::new_v4());
    let res = get(&app, &unknown, &ctx.admin.token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn duplicate_identity_in_tenant_conflicts() -> Result<()> {
    let ctx = TestContext::new().await;
    let app = ctx.router();
    let uri = members_uri(&ctx);

    let first = post(&app, &uri, Some(&ctx.owner.token), member("ada")).await?;
    assert_eq!(first.status, StatusCode::CREATED);

    let mut same_username = member("ada");
    same_username["email"] = json!("other@acme.test");
    let res = post(&app, &uri, Some(&ctx.owner.token), same_username).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.message(), "Team member with this email or username already exists");

    // Username of an ordinary tenant user counts too
    let res = post(&app, &uri, Some(&ctx.owner.token), member("admin")).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn deletion_guards() -> Result<()> {
    let ctx = TestContext::new().await;
    let app = ctx.router();
    let uri = members_uri(&ctx);

    let res = delete(&app, &format!("{}/{}", uri, ctx.owner.id()), &ctx.owner.token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.message(), "Cannot delete yourself");

    let res = delete(&app, &format!("{}/{}", uri, ctx.admin.id()), &ctx.owner.token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.message(), "Cannot delete admin users");

    let second_admin = ctx.account(&ctx.acme, Role::TenantAdmin, "admin2").await;
    let res = delete(&app, &format!("{}/{}", uri, second_admin.id()), &ctx.admin.token).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    // A plain user is not a member of the project
    let res = delete(&app, &format!("{}/{}", uri, ctx.user.id()), &ctx.owner.token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = delete(&app, &format!("{}/{}", uri, uuid::Uuid::new_v4()), &ctx.owner.token).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.message(), "Team member not found");
    Ok(())
}

#[tokio::test]
async fn password_change_is_rehashed() -> Result<()> {
    let ctx = TestContext::new().await;
    let app = ctx.router();
    let uri = members_uri(&ctx);

    let created = post(&app, &uri, Some(&ctx.owner.token), member("ada")).await?;
    let id = created.data()["id"].as_str().unwrap_or_default().to_string();

    let res = put(&app, &format!("{}/{}", uri, id), &ctx.owner.token, json!({ "password": "changed-1" })).await?;
    assert_eq!(res.status, StatusCode::OK);

    let login = post(&app, "/api/auth/login", None, json!({ "email": "ada@acme.test", "password": "changed-1" })).await?;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.data()["user"]["role"], "team-member");
    Ok(())
}

#[tokio::test]
async fn malformed_ids_fail_validation() -> Result<()> {
    let ctx = TestContext::new().await;
    let res = get(&ctx.router(), "/api/projects/not-a-uuid/team-members/also-bad", &ctx.admin.token).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.errors(),
        vec![
            "\"projectId\" must be a valid GUID".to_string(),
            "\"id\" must be a valid GUID".to_string()
        ]
    );
    Ok(())
}
