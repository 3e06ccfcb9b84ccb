// handlers/elevated/tenants.rs - Tenant management (super-admin tenant only)

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::TenantView;
use crate::middleware::{ApiResult, JsonBody, RequestContext};
use crate::services::tenant_service::{CreateTenantRequest, CreatedTenant, TenantStatusRequest};
use crate::AppState;

/**
 * POST /api/tenants - Create a tenant and its first tenant_admin
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Acme",
 *   "domain": "acme.io",
 *   "websiteName": "Acme Inc",          // Optional, defaults to name
 *   "favicon": "https://...",            // Optional
 *   "adminEmail": "boss@acme.io",
 *   "adminPassword": "secret1",
 *   "adminUsername": "boss",             // Optional, defaults to e-mail local part
 *   "adminFirstName": "Bo",              // Optional
 *   "adminLastName": "Ss"                // Optional
 * }
 * ```
 */
pub async fn tenant_create(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(request): JsonBody<CreateTenantRequest>,
) -> ApiResult<CreatedTenant> {
    state.tenants().create_tenant(&ctx.actor(), request).await
}

/// GET /api/tenants
pub async fn tenant_list(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Vec<TenantView>> {
    state.tenants().list_tenants(&ctx.actor()).await
}

/// PUT /api/tenants/:id/status - `{ "isActive": bool }`, idempotent
pub async fn tenant_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<TenantStatusRequest>,
) -> ApiResult<TenantView> {
    state.tenants().set_status(&ctx.actor(), id, request.is_active).await
}
