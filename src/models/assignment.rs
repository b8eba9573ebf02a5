use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::classroom::Classroom;
use crate::models::user::UserPublic;

/// Row in the `assignments` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: String,
    pub due_date: Option<DateTime<Utc>>,
    pub max_score: f64,
    pub weight: f64,
    pub allow_late_submission: bool,
    pub late_penalty_percent: f64,
    pub submission_format: String,
    pub max_file_size_mb: i32,
    pub allowed_file_types: Option<serde_json::Value>,
    pub is_published: bool,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Assignment with its classroom and creator populated.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: Assignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classroom: Option<Classroom>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<UserPublic>,
}
