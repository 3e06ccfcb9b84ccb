// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::extract::State;

use crate::middleware::{ApiResult, JsonBody};
use crate::services::user_service::{LoginRequest, LoginResponse};
use crate::AppState;

/**
 * POST /api/auth/login - Authenticate with e-mail and password
 *
 * Expected Input:
 * ```json
 * { "email": "jane@acme.io", "password": "secret1" }
 * ```
 *
 * Returns `{ token, user }`. Unknown e-mail and wrong password both answer
 * 401; an inactive account or tenant answers 403.
 */
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    state.users().login(request).await
}
