use axum::extract::{Extension, State};
use axum::response::Json;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::services::profile_service::{ProfileUpdate, ProfileView};
use crate::services::AppState;

/// GET /api/v1/profile - the caller's account with lookups resolved
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<ApiResponse<ProfileView>, ApiError> {
    let profile = state.profiles.get(user.user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// PATCH /api/v1/profile - partial update across user and profile rows
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ProfileUpdate>,
) -> Result<ApiResponse<ProfileView>, ApiError> {
    let profile = state.profiles.update(user.user_id, req).await?;
    Ok(ApiResponse::success(profile))
}
