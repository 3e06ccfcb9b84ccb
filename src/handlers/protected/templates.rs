// handlers/protected/templates.rs - WhatsApp message templates of the tenant

use axum::extract::{Path, Query, State};
use serde_json::Value;

use crate::external::NewTemplate;
use crate::middleware::{ApiResult, JsonBody, RequestContext};
use crate::services::template_service::AnalyticsQuery;
use crate::AppState;

/// GET /api/templates
pub async fn templates_get(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Vec<Value>> {
    state.templates().list(&ctx.tenant).await
}

/**
 * POST /api/templates - Submit a template (admins only)
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "order_update",
 *   "language": "en_US",
 *   "category": "UTILITY",
 *   "components": [{ "type": "BODY", "text": "Your order {{1}} shipped" }]
 * }
 * ```
 */
pub async fn template_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(template): JsonBody<NewTemplate>,
) -> ApiResult<Value> {
    state.templates().create(&ctx.actor(), &ctx.tenant, template).await
}

/// DELETE /api/templates/:name (admins only)
pub async fn template_delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(name): Path<String>,
) -> ApiResult<()> {
    state.templates().delete(&ctx.actor(), &ctx.tenant, &name).await
}

/// GET /api/templates/analytics?start=&end= - unix seconds
pub async fn analytics_get(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Value> {
    state.templates().analytics(&ctx.tenant, &query).await
}
