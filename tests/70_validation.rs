mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;

use common::{dispatch, post, put, send, TestContext};

#[tokio::test]
async fn every_violation_is_reported() -> Result<()> {
    let ctx = TestContext::new().await;
    let res = post(
        &ctx.router(),
        "/api/auth/register",
        None,
        json!({ "email": "not-an-email", "password": "123", "tenantDomain": "acme.test" }),
    )
    .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.message(), "Validation failed");
    assert_eq!(
        res.errors(),
        vec![
            "\"username\" is required".to_string(),
            "\"email\" must be a valid email".to_string(),
            "\"password\" length must be at least 6 characters long".to_string(),
            "\"firstName\" is required".to_string(),
            "\"lastName\" is required".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn abort_early_reports_only_the_first() -> Result<()> {
    let mut ctx = TestContext::new().await;
    ctx.config.api.validation_abort_early = true;

    let res = post(&ctx.router(), "/api/auth/login", None, json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.errors(), vec!["\"email\" is required".to_string()]);
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_ignored() -> Result<()> {
    let ctx = TestContext::new().await;
    let res = post(
        &ctx.router(),
        "/api/auth/login",
        None,
        json!({ "email": "admin@acme.test", "password": common::PASSWORD, "remember": true }),
    )
    .await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let ctx = TestContext::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))?;

    let res = dispatch(&ctx.router(), request).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.errors(), vec!["Request body must be valid JSON".to_string()]);
    Ok(())
}

#[tokio::test]
async fn nested_settings_are_checked() -> Result<()> {
    let ctx = TestContext::new().await;
    let res = put(
        &ctx.router(),
        &format!("/api/tenants/{}", ctx.acme.id),
        &ctx.admin.token,
        json!({ "favicon": "not a url", "whatsapp": { "baseUrl": 42 } }),
    )
    .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let errors = res.errors();
    assert!(errors.contains(&"\"favicon\" must be a valid uri".to_string()), "{:?}", errors);
    assert!(errors.iter().any(|e| e.starts_with("\"whatsapp.baseUrl\"")), "{:?}", errors);
    Ok(())
}

#[tokio::test]
async fn body_flags_must_be_json_booleans() -> Result<()> {
    let ctx = TestContext::new().await;
    let uri = format!("/api/tenants/{}/status", ctx.acme.id);

    let res = put(&ctx.router(), &uri, &ctx.root.token, json!({ "isActive": "true" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.message(), "Validation failed");
    assert_eq!(res.errors(), vec!["\"isActive\" must be a boolean".to_string()]);

    let res = put(&ctx.router(), &uri, &ctx.root.token, json!({ "isActive": false })).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn validation_runs_before_authentication() -> Result<()> {
    let ctx = TestContext::new().await;
    let uri = format!("/api/projects/{}/team-members", ctx.project.id);

    let res = post(&ctx.router(), &uri, None, json!({})).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.message(), "Validation failed");
    assert!(res.errors().contains(&"\"username\" is required".to_string()));

    let complete = json!({
        "username": "newbie",
        "email": "newbie@acme.test",
        "password": "secret1",
        "firstName": "New",
        "lastName": "Member",
    });
    let res = post(&ctx.router(), &uri, None, complete).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.message(), "Authentication required");
    Ok(())
}

#[tokio::test]
async fn unvalidated_routes_still_require_a_token() -> Result<()> {
    let ctx = TestContext::new().await;
    let res = send(&ctx.router(), Method::GET, "/api/users", None, None).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}
