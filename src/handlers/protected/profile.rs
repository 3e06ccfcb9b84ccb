// handlers/protected/profile.rs - The caller's own account

use axum::extract::State;

use crate::database::models::UserView;
use crate::middleware::{ApiResult, JsonBody, RequestContext};
use crate::services::user_service::{Profile, UpdateProfileRequest};
use crate::AppState;

/// GET /api/auth/me - Current user (without credentials) and tenant summary
pub async fn me_get(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Profile> {
    state.users().me(&ctx)
}

/**
 * PUT /api/users/profile - Update own profile
 *
 * Any of `username`, `password`, `firstName`, `lastName`, `mobileNumber`.
 * A new password is re-hashed; a username already used in the tenant is 409.
 */
pub async fn profile_put(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> ApiResult<UserView> {
    state.users().update_profile(ctx.user, request).await
}
