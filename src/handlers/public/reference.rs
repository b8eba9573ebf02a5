use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::models::{Gender, Prefix, PrefixDetail};
use crate::services::AppState;

/// GET /api/v1/genders
pub async fn list_genders(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Gender>>, ApiError> {
    let genders = state.references.list_genders().await?;
    Ok(ApiResponse::success(genders))
}

/// GET /api/v1/genders/:id
pub async fn get_gender(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<Gender>, ApiError> {
    let gender = state.references.get_gender(id).await?;
    Ok(ApiResponse::success(gender))
}

/// GET /api/v1/prefixes/by-gender/:code
pub async fn list_prefixes_by_gender(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<Vec<Prefix>>, ApiError> {
    let prefixes = state.references.list_prefixes_by_gender(&code).await?;
    Ok(ApiResponse::success(prefixes))
}

/// GET /api/v1/prefixes
pub async fn list_prefixes(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<PrefixDetail>>, ApiError> {
    let prefixes = state.references.list_prefixes().await?;
    Ok(ApiResponse::success(prefixes))
}

/// GET /api/v1/prefixes/:id
pub async fn get_prefix(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<PrefixDetail>, ApiError> {
    let prefix = state.references.get_prefix(id).await?;
    Ok(ApiResponse::success(prefix))
}
