use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::models::School;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct SchoolQuery {
    pub search: Option<String>,
}

/// GET /api/v1/schools - active schools for the registration picker
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SchoolQuery>,
) -> Result<ApiResponse<Vec<School>>, ApiError> {
    let schools = state.schools.list(query.search.as_deref()).await?;
    Ok(ApiResponse::success(schools))
}

/// GET /api/v1/schools/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<School>, ApiError> {
    let school = state.schools.get(id).await?;
    Ok(ApiResponse::success(school))
}
