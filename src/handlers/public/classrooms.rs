use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, PaginatedResponse};
use crate::models::{Classroom, ClassroomDetail};
use crate::services::classroom_service::ClassroomFilter;
use crate::services::{AppState, PageInfo, PageParams};

#[derive(Debug, Deserialize)]
pub struct ClassroomListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub school_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/classrooms - paginated listing with filters
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ClassroomListQuery>,
) -> Result<PaginatedResponse<Classroom>, ApiError> {
    let (page, limit) = PageParams {
        page: query.page,
        limit: query.limit,
    }
    .resolve();
    let filter = ClassroomFilter {
        search: query.search,
        school_id: query.school_id,
        teacher_id: query.teacher_id,
        subject: query.subject,
        grade_level: query.grade_level,
        is_active: query.is_active,
    };

    let (classrooms, total) = state.classrooms.list(&filter, page, limit).await?;
    Ok(PaginatedResponse::new(
        classrooms,
        PageInfo::new(page, limit, total),
    ))
}

/// GET /api/v1/classrooms/:id - classroom with school, teacher and roster
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ClassroomDetail>, ApiError> {
    let classroom = state.classrooms.get(id).await?;
    Ok(ApiResponse::success(classroom))
}

/// GET /api/v1/classrooms/code/:code - lookup for students joining by code
pub async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<ApiResponse<ClassroomDetail>, ApiError> {
    let classroom = state.classrooms.get_by_code(&code).await?;
    Ok(ApiResponse::success(classroom))
}
