use axum::extract::{Extension, Path, State};
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::models::ClassroomDetail;
use crate::services::classroom_service::{ClassroomPatch, CreateClassroom};
use crate::services::AppState;

/// POST /api/v1/classrooms - create a classroom owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateClassroom>,
) -> Result<ApiResponse<ClassroomDetail>, ApiError> {
    let classroom = state.classrooms.create(req, user.user_id).await?;
    Ok(ApiResponse::created(classroom))
}

/// PATCH /api/v1/classrooms/:id - partial update, owner only
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ClassroomPatch>,
) -> Result<ApiResponse<ClassroomDetail>, ApiError> {
    let classroom = state.classrooms.update(id, patch, user.user_id).await?;
    Ok(ApiResponse::success(classroom))
}

/// DELETE /api/v1/classrooms/:id - soft delete, owner only
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Value>, ApiError> {
    state.classrooms.delete(id, user.user_id).await?;
    Ok(ApiResponse::success(
        json!({"message": "Classroom deleted successfully"}),
    ))
}
