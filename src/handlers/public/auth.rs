use axum::extract::State;
use axum::response::Json;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::auth_service::{
    LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, TokenResponse,
};
use crate::services::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let response = state.auth.login(req).await?;
    Ok(ApiResponse::success(response))
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let response = state.auth.register(req).await?;
    Ok(ApiResponse::created(response))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<ApiResponse<RefreshResponse>, ApiError> {
    let response = state.auth.refresh(req).await?;
    Ok(ApiResponse::success(response))
}
