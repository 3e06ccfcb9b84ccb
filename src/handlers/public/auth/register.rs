// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::extract::State;

use crate::database::models::UserView;
use crate::middleware::{ApiResult, JsonBody};
use crate::services::user_service::RegisterRequest;
use crate::AppState;

/**
 * POST /api/auth/register - Create a `user` account in an existing tenant
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "jane",
 *   "email": "jane@acme.io",
 *   "password": "secret1",
 *   "firstName": "Jane",
 *   "lastName": "Doe",
 *   "mobileNumber": "+15550100",   // Optional
 *   "tenantDomain": "acme.io"      // Tenant to join
 * }
 * ```
 */
pub async fn register_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult<UserView> {
    state.users().register(request).await
}
