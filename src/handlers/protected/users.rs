// handlers/protected/users.rs - Admin-managed user accounts

use axum::extract::State;

use crate::database::models::UserView;
use crate::middleware::{ApiResult, JsonBody, RequestContext};
use crate::services::user_service::CreateUserRequest;
use crate::AppState;

/// POST /api/users - tenant_admin / super_admin create a `user` or
/// `tenant_admin` in their own tenant
pub async fn users_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ApiResult<UserView> {
    state.users().create_user(&ctx.actor(), request).await
}

/// GET /api/users - Users of the caller's tenant, admins only
pub async fn users_get(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Vec<UserView>> {
    state.users().list_users(&ctx.actor()).await
}
