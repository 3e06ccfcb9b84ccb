use serde::Deserialize;
use serde_json::Value;

use crate::authz::{self, Actor};
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::external::{MessagingClient, NewTemplate};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsQuery {
    pub start: String,
    pub end: String,
}

impl AnalyticsQuery {
    fn window(&self) -> Result<(i64, i64), ApiError> {
        let parse = |name: &str, raw: &str| {
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request(format!("\"{}\" must be an integer", name)))
        };
        let start = parse("start", &self.start)?;
        let end = parse("end", &self.end)?;
        if end < start {
            return Err(ApiError::bad_request("\"end\" must not be before \"start\""));
        }
        Ok((start, end))
    }
}

/// Message templates live at the tenant's WhatsApp Business account; nothing
/// is stored locally.
pub struct TemplateService {
    messaging: MessagingClient,
}

impl TemplateService {
    pub fn new(messaging: MessagingClient) -> Self {
        Self { messaging }
    }

    pub async fn list(&self, tenant: &Tenant) -> ApiResult<Vec<Value>> {
        let templates = self.messaging.list_templates(&tenant.whatsapp).await?;
        Ok(ApiResponse::success("Templates retrieved successfully", templates))
    }

    pub async fn create(&self, actor: &Actor, tenant: &Tenant, template: NewTemplate) -> ApiResult<Value> {
        authz::require_admin(actor.role).require("template create")?;

        let created = self.messaging.create_template(&tenant.whatsapp, &template).await?;
        tracing::info!("Tenant {} created template '{}'", tenant.id, template.name);
        Ok(ApiResponse::created("Template created successfully", created))
    }

    pub async fn delete(&self, actor: &Actor, tenant: &Tenant, name: &str) -> ApiResult<()> {
        authz::require_admin(actor.role).require("template delete")?;

        self.messaging.delete_template(&tenant.whatsapp, name).await?;
        tracing::info!("Tenant {} deleted template '{}'", tenant.id, name);
        Ok(ApiResponse::message("Template deleted successfully"))
    }

    pub async fn analytics(&self, tenant: &Tenant, query: &AnalyticsQuery) -> ApiResult<Value> {
        let (start, end) = query.window()?;
        let analytics = self.messaging.analytics(&tenant.whatsapp, start, end).await?;
        Ok(ApiResponse::success("Analytics retrieved successfully", analytics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn service() -> TemplateService {
        TemplateService::new(MessagingClient::new(&crate::config::AppConfig::test().api))
    }

    #[test]
    fn analytics_window_must_be_ordered() {
        let query = AnalyticsQuery {
            start: "200".into(),
            end: "100".into(),
        };
        assert_eq!(query.window().unwrap_err().status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unconfigured_credentials_are_a_bad_request() {
        let tenant = Tenant::new("acme", "acme.io", "Acme", "");
        let err = service().list(&tenant).await.unwrap_err();
        assert_eq!(err, ApiError::bad_request("Messaging API credentials are not configured"));
    }

    #[tokio::test]
    async fn template_deletion_requires_admin() {
        let tenant = Tenant::new("acme", "acme.io", "Acme", "");
        let actor = Actor {
            user_id: Uuid::new_v4(),
            role: Role::User,
            tenant_id: tenant.id,
            tenant_is_super_admin: false,
        };
        let err = service().delete(&actor, &tenant, "welcome").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
