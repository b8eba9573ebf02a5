use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::enrollment::EnrolledStudent;
use crate::models::school::School;
use crate::models::user::UserPublic;

/// Row in the `classrooms` table.
///
/// A classroom is live while `deleted_at` is null; only live rows are
/// returned by default reads or eligible for mutation. `classroom_code` is
/// unique among live classrooms.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Classroom {
    pub id: Uuid,
    pub school_id: Option<Uuid>,
    pub name: String,
    pub subject: String,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    pub section: Option<String>,
    pub room_number: Option<String>,
    pub teacher_id: Uuid,
    pub classroom_code: String,
    pub max_students: i32,
    pub schedule: Option<serde_json::Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Classroom with its related entities populated.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomDetail {
    #[serde(flatten)]
    pub classroom: Classroom,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<School>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<UserPublic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<EnrolledStudent>>,
}
