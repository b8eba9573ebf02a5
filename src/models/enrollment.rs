use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Active enrollment row joined with the student's public fields.
///
/// Enrollment rows are the dependents that block classroom deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrolledStudent {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_number: Option<String>,
    pub seat_number: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    pub is_active: bool,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}
