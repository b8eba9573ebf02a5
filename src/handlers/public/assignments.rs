use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, PaginatedResponse};
use crate::models::{Assignment, AssignmentDetail};
use crate::services::assignment_service::AssignmentFilter;
use crate::services::{AppState, PageInfo, PageParams};

#[derive(Debug, Deserialize)]
pub struct AssignmentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub classroom_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub assignment_type: Option<String>,
    pub status: Option<String>,
    pub is_published: Option<bool>,
    pub due_soon: Option<bool>,
    pub overdue: Option<bool>,
}

/// GET /api/v1/assignments - paginated listing with filters
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<AssignmentListQuery>,
) -> Result<PaginatedResponse<Assignment>, ApiError> {
    let (page, limit) = PageParams {
        page: query.page,
        limit: query.limit,
    }
    .resolve();
    let filter = AssignmentFilter {
        search: query.search,
        classroom_id: query.classroom_id,
        created_by: query.created_by,
        assignment_type: query.assignment_type,
        status: query.status,
        is_published: query.is_published,
        due_soon: query.due_soon,
        overdue: query.overdue,
    };

    let (assignments, total) = state.assignments.list(&filter, page, limit).await?;
    Ok(PaginatedResponse::new(
        assignments,
        PageInfo::new(page, limit, total),
    ))
}

/// GET /api/v1/assignments/:id - assignment with classroom and creator
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<AssignmentDetail>, ApiError> {
    let assignment = state.assignments.get(id).await?;
    Ok(ApiResponse::success(assignment))
}
