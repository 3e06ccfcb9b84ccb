// handlers/protected/media.rs - Uploaded media of the caller

use axum::extract::{Multipart, Path, State};
use uuid::Uuid;

use crate::database::models::Media;
use crate::middleware::{ApiResponse, ApiResult, RequestContext};
use crate::services::media_service::read_upload;
use crate::AppState;

/**
 * POST /api/media/upload - multipart/form-data with a `file` field
 *
 * Files above the configured cap (10 MB by default) are refused while the
 * body is being read, before anything is sent to the media host.
 */
pub async fn media_upload(
    State(state): State<AppState>,
    ctx: RequestContext,
    mut multipart: Multipart,
) -> ApiResult<Media> {
    let file = read_upload(&mut multipart, state.config.media.max_file_bytes).await?;
    let media = state.media().upload(ctx.user.id, file).await?;
    Ok(ApiResponse::created("File uploaded successfully", media))
}

/// GET /api/media - Own media, newest first
pub async fn media_get(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Vec<Media>> {
    let items = state.media().list(ctx.user.id).await?;
    Ok(ApiResponse::success("Media retrieved successfully", items))
}

/// DELETE /api/media/:id - 404 unless the caller uploaded it
pub async fn media_delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.media().delete(ctx.user.id, id).await?;
    Ok(ApiResponse::message("Media deleted successfully"))
}
