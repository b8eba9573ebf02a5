use axum::extract::{Extension, Path, State};
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, AuthUser};
use crate::models::AssignmentDetail;
use crate::services::assignment_service::{AssignmentPatch, CreateAssignment};
use crate::services::AppState;

/// POST /api/v1/assignments - create in a classroom the caller teaches
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateAssignment>,
) -> Result<ApiResponse<AssignmentDetail>, ApiError> {
    let assignment = state.assignments.create(req, user.user_id).await?;
    Ok(ApiResponse::created(assignment))
}

/// PATCH /api/v1/assignments/:id - partial update, creator or classroom teacher
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AssignmentPatch>,
) -> Result<ApiResponse<AssignmentDetail>, ApiError> {
    let assignment = state.assignments.update(id, patch, user.user_id).await?;
    Ok(ApiResponse::success(assignment))
}

/// DELETE /api/v1/assignments/:id - soft delete, blocked by live submissions
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Value>, ApiError> {
    state.assignments.delete(id, user.user_id).await?;
    Ok(ApiResponse::success(
        json!({"message": "Assignment deleted successfully"}),
    ))
}

/// POST /api/v1/assignments/:id/publish
pub async fn publish(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<AssignmentDetail>, ApiError> {
    let assignment = state.assignments.publish(id, user.user_id).await?;
    Ok(ApiResponse::success(assignment))
}
