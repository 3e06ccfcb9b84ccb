// handlers/protected/tenant_settings.rs - PUT /api/tenants/:id handler

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::{TenantSettingsPatch, TenantView};
use crate::middleware::{ApiResult, JsonBody, RequestContext};
use crate::AppState;

/**
 * PUT /api/tenants/:id - Update website name, favicon and messaging credentials
 *
 * Only an admin of tenant `:id` itself may do this; every other caller gets
 * 403, including admins of other tenants.
 *
 * Expected Input (all optional):
 * ```json
 * {
 *   "websiteName": "Acme",
 *   "favicon": "https://cdn.acme.io/favicon.ico",
 *   "whatsapp": { "accountId": "...", "accessToken": "...", "appId": "...",
 *                 "baseUrl": "https://graph.facebook.com", "apiVersion": "v19.0" }
 * }
 * ```
 */
pub async fn tenant_settings_put(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    JsonBody(patch): JsonBody<TenantSettingsPatch>,
) -> ApiResult<TenantView> {
    state.tenants().update_settings(&ctx.actor(), id, patch).await
}
