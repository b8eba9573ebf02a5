use axum::extract::{Path, State};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::profile_service::PublicProfileView;
use crate::services::AppState;

/// GET /api/v1/profile/:id - public-only profile of any user
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<PublicProfileView>, ApiError> {
    let profile = state.profiles.get_by_id(id).await?;
    Ok(ApiResponse::success(profile))
}
