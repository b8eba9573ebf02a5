use axum::extract::{Path, State};
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::models::School;
use crate::services::school_service::{CreateSchool, SchoolPatch};
use crate::services::AppState;

/// POST /api/v1/schools - any authenticated user may add a school
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSchool>,
) -> Result<ApiResponse<School>, ApiError> {
    let school = state.schools.create(req).await?;
    Ok(ApiResponse::created(school))
}

/// PATCH /api/v1/schools/:id - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SchoolPatch>,
) -> Result<ApiResponse<School>, ApiError> {
    let school = state.schools.update(id, patch).await?;
    Ok(ApiResponse::success(school))
}

/// DELETE /api/v1/schools/:id - deactivate, blocked by active users
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Value>, ApiError> {
    state.schools.delete(id).await?;
    Ok(ApiResponse::success(
        json!({"message": "School deleted successfully"}),
    ))
}
