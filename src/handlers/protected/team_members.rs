// handlers/protected/team_members.rs - /api/projects/:projectId/team-members
//
// Allowed for a tenant_admin or the project's owner. A missing project is
// reported as 404 before any permission check.

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::UserView;
use crate::middleware::{ApiResult, JsonBody, RequestContext};
use crate::services::team_service::{CreateTeamMemberRequest, UpdateTeamMemberRequest};
use crate::AppState;

/**
 * POST /api/projects/:projectId/team-members - Add a team member
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "ada",
 *   "email": "ada@acme.io",
 *   "password": "secret1",
 *   "firstName": "Ada",
 *   "lastName": "Lovelace",
 *   "mobileNumber": "+15550100",          // Optional
 *   "permissions": ["templates:read"]     // Optional
 * }
 * ```
 */
pub async fn team_member_post(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
    JsonBody(request): JsonBody<CreateTeamMemberRequest>,
) -> ApiResult<UserView> {
    state.team().create(&ctx.actor(), project_id, request).await
}

/// GET /api/projects/:projectId/team-members
pub async fn team_members_get(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Vec<UserView>> {
    state.team().list(&ctx.actor(), project_id).await
}

/// GET /api/projects/:projectId/team-members/:id
pub async fn team_member_get(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<UserView> {
    state.team().get(&ctx.actor(), project_id, id).await
}

/// PUT /api/projects/:projectId/team-members/:id - Partial update
pub async fn team_member_put(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
    JsonBody(request): JsonBody<UpdateTeamMemberRequest>,
) -> ApiResult<UserView> {
    state.team().update(&ctx.actor(), project_id, id, request).await
}

/// DELETE /api/projects/:projectId/team-members/:id
///
/// Refuses to delete the caller or any admin account.
pub async fn team_member_delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path((project_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    state.team().delete(&ctx.actor(), project_id, id).await
}
