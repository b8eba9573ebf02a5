use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Assignment, AssignmentDetail, Classroom, UserPublic};
use crate::services::error::ServiceError;
use crate::services::pagination::PageParams;

const ASSIGNMENT_COLUMNS: &str = "id, classroom_id, title, description, instructions, \
     assignment_type, due_date, max_score, weight, allow_late_submission, \
     late_penalty_percent, submission_format, max_file_size_mb, allowed_file_types, \
     is_published, status, created_by, created_at, updated_at, deleted_at";

const CLASSROOM_COLUMNS: &str = "id, school_id, name, subject, description, grade_level, \
     section, room_number, teacher_id, classroom_code, max_students, schedule, is_active, \
     created_at, updated_at, deleted_at";

#[derive(Debug, Deserialize)]
pub struct CreateAssignment {
    pub classroom_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: Option<String>,
    pub due_date: Option<chrono::DateTime<Utc>>,
    pub max_score: Option<f64>,
    pub weight: Option<f64>,
    pub allow_late_submission: Option<bool>,
    pub late_penalty_percent: Option<f64>,
    pub submission_format: Option<String>,
    pub max_file_size_mb: Option<i32>,
    pub allowed_file_types: Option<serde_json::Value>,
    pub is_published: Option<bool>,
}

/// Partial update: only fields present in the payload are applied.
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub assignment_type: Option<String>,
    pub due_date: Option<chrono::DateTime<Utc>>,
    pub max_score: Option<f64>,
    pub weight: Option<f64>,
    pub allow_late_submission: Option<bool>,
    pub late_penalty_percent: Option<f64>,
    pub submission_format: Option<String>,
    pub max_file_size_mb: Option<i32>,
    pub allowed_file_types: Option<serde_json::Value>,
    pub is_published: Option<bool>,
    pub status: Option<String>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.instructions.is_none()
            && self.assignment_type.is_none()
            && self.due_date.is_none()
            && self.max_score.is_none()
            && self.weight.is_none()
            && self.allow_late_submission.is_none()
            && self.late_penalty_percent.is_none()
            && self.submission_format.is_none()
            && self.max_file_size_mb.is_none()
            && self.allowed_file_types.is_none()
            && self.is_published.is_none()
            && self.status.is_none()
    }
}

/// Optional AND-combined listing filters. `due_soon` and `overdue` are
/// derived from the clock at query time.
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentFilter {
    pub search: Option<String>,
    pub classroom_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub assignment_type: Option<String>,
    pub status: Option<String>,
    pub is_published: Option<bool>,
    pub due_soon: Option<bool>,
    pub overdue: Option<bool>,
}

#[derive(Clone)]
pub struct AssignmentService {
    pool: PgPool,
}

impl AssignmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an assignment in a classroom the actor teaches.
    ///
    /// A missing classroom and a classroom owned by someone else produce
    /// the same error so callers cannot probe for existence.
    pub async fn create(
        &self,
        req: CreateAssignment,
        teacher_id: Uuid,
    ) -> Result<AssignmentDetail, ServiceError> {
        self.verify_classroom_access(req.classroom_id, teacher_id)
            .await?;

        let now = Utc::now();
        let assignment: Assignment = sqlx::query_as(&format!(
            "INSERT INTO assignments \
             (id, classroom_id, title, description, instructions, assignment_type, due_date, \
              max_score, weight, allow_late_submission, late_penalty_percent, submission_format, \
              max_file_size_mb, allowed_file_types, is_published, status, created_by, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     'draft', $16, $17, $17) \
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.classroom_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.instructions)
        .bind(req.assignment_type.as_deref().unwrap_or("homework"))
        .bind(req.due_date)
        .bind(req.max_score.unwrap_or(100.0))
        .bind(req.weight.unwrap_or(1.0))
        .bind(req.allow_late_submission.unwrap_or(false))
        .bind(req.late_penalty_percent.unwrap_or(0.0))
        .bind(req.submission_format.as_deref().unwrap_or("both"))
        .bind(req.max_file_size_mb.unwrap_or(10))
        .bind(&req.allowed_file_types)
        .bind(req.is_published.unwrap_or(false))
        .bind(teacher_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.load_detail(assignment).await
    }

    /// List live assignments with filters and pagination, newest first.
    pub async fn list(
        &self,
        filter: &AssignmentFilter,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Assignment>, i64), ServiceError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM assignments WHERE deleted_at IS NULL");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE deleted_at IS NULL"
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(PageParams::offset(page, limit));

        let assignments: Vec<Assignment> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok((assignments, total))
    }

    /// Get a live assignment by id with relations.
    pub async fn get(&self, id: Uuid) -> Result<AssignmentDetail, ServiceError> {
        let assignment = self.fetch_live(id).await?;
        self.load_detail(assignment).await
    }

    /// Apply a partial update. The creator or the classroom's teacher may
    /// mutate the assignment.
    pub async fn update(
        &self,
        id: Uuid,
        patch: AssignmentPatch,
        actor_id: Uuid,
    ) -> Result<AssignmentDetail, ServiceError> {
        let assignment = self.fetch_live(id).await?;
        self.authorize(&assignment, actor_id, "update this assignment")
            .await?;

        if patch.is_empty() {
            return Err(ServiceError::NoOpUpdate);
        }

        let mut qb = patch_update_query(id, patch);
        qb.build().execute(&self.pool).await?;

        let assignment = self.fetch_live(id).await?;
        self.load_detail(assignment).await
    }

    /// Soft delete. Blocked while the assignment has live submissions.
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), ServiceError> {
        let assignment = self.fetch_live(id).await?;
        self.authorize(&assignment, actor_id, "delete this assignment")
            .await?;

        let submission_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignment_submissions \
             WHERE assignment_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if submission_count > 0 {
            return Err(ServiceError::DependencyConflict(
                "cannot delete assignment with existing submissions",
            ));
        }

        sqlx::query("UPDATE assignments SET deleted_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Publish: a fixed-field update, same authorization and re-read path.
    pub async fn publish(&self, id: Uuid, actor_id: Uuid) -> Result<AssignmentDetail, ServiceError> {
        let patch = AssignmentPatch {
            is_published: Some(true),
            status: Some("published".to_string()),
            ..Default::default()
        };
        self.update(id, patch, actor_id).await
    }

    /// Actor must be the creator or the teacher of the parent classroom.
    async fn authorize(
        &self,
        assignment: &Assignment,
        actor_id: Uuid,
        action: &'static str,
    ) -> Result<(), ServiceError> {
        if owns_assignment(assignment.created_by, None, actor_id) {
            return Ok(());
        }

        let teacher_id: Option<Uuid> = sqlx::query_scalar(
            "SELECT teacher_id FROM classrooms WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(assignment.classroom_id)
        .fetch_optional(&self.pool)
        .await?;

        if owns_assignment(assignment.created_by, teacher_id, actor_id) {
            return Ok(());
        }
        Err(ServiceError::Unauthorized(action))
    }

    async fn verify_classroom_access(
        &self,
        classroom_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<(), ServiceError> {
        let found: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM classrooms \
             WHERE id = $1 AND teacher_id = $2 AND deleted_at IS NULL",
        )
        .bind(classroom_id)
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        found
            .map(|_| ())
            .ok_or(ServiceError::AccessDenied("classroom"))
    }

    async fn fetch_live(&self, id: Uuid) -> Result<Assignment, ServiceError> {
        let assignment: Option<Assignment> = sqlx::query_as(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments \
             WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        assignment.ok_or(ServiceError::NotFound("assignment"))
    }

    async fn load_detail(&self, assignment: Assignment) -> Result<AssignmentDetail, ServiceError> {
        let classroom: Option<Classroom> = sqlx::query_as(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE id = $1"
        ))
        .bind(assignment.classroom_id)
        .fetch_optional(&self.pool)
        .await?;

        let creator: Option<UserPublic> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, email, role FROM users WHERE id = $1",
        )
        .bind(assignment.created_by)
        .fetch_optional(&self.pool)
        .await?;

        Ok(AssignmentDetail {
            assignment,
            classroom,
            creator,
        })
    }
}

/// Mutation rights: the creator always, the live classroom's teacher when
/// known. A deleted classroom leaves only the creator.
fn owns_assignment(created_by: Uuid, classroom_teacher: Option<Uuid>, actor_id: Uuid) -> bool {
    created_by == actor_id || classroom_teacher == Some(actor_id)
}

/// Build the UPDATE for a patch: one SET clause per present field, plus the
/// updated_at stamp.
fn patch_update_query(id: Uuid, patch: AssignmentPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE assignments SET ");
    let mut sets = qb.separated(", ");
    if let Some(v) = patch.title {
        sets.push("title = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.description {
        sets.push("description = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.instructions {
        sets.push("instructions = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.assignment_type {
        sets.push("assignment_type = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.due_date {
        sets.push("due_date = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.max_score {
        sets.push("max_score = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.weight {
        sets.push("weight = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.allow_late_submission {
        sets.push("allow_late_submission = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.late_penalty_percent {
        sets.push("late_penalty_percent = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.submission_format {
        sets.push("submission_format = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.max_file_size_mb {
        sets.push("max_file_size_mb = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.allowed_file_types {
        sets.push("allowed_file_types = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.is_published {
        sets.push("is_published = ").push_bind_unseparated(v);
    }
    if let Some(v) = patch.status {
        sets.push("status = ").push_bind_unseparated(v);
    }
    sets.push("updated_at = ").push_bind_unseparated(Utc::now());
    qb.push(" WHERE id = ").push_bind(id);
    qb
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AssignmentFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let term = format!("%{}%", search.to_lowercase());
        qb.push(" AND (LOWER(title) LIKE ")
            .push_bind(term.clone())
            .push(" OR LOWER(description) LIKE ")
            .push_bind(term)
            .push(")");
    }
    if let Some(classroom_id) = filter.classroom_id {
        qb.push(" AND classroom_id = ").push_bind(classroom_id);
    }
    if let Some(created_by) = filter.created_by {
        qb.push(" AND created_by = ").push_bind(created_by);
    }
    if let Some(assignment_type) = filter.assignment_type.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND assignment_type = ")
            .push_bind(assignment_type.to_string());
    }
    if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(is_published) = filter.is_published {
        qb.push(" AND is_published = ").push_bind(is_published);
    }
    if filter.due_soon == Some(true) {
        // Due within 7 days
        let now = Utc::now();
        qb.push(" AND due_date IS NOT NULL AND due_date >= ")
            .push_bind(now)
            .push(" AND due_date <= ")
            .push_bind(now + Duration::days(7));
    }
    if filter.overdue == Some(true) {
        // Past due date
        qb.push(" AND due_date IS NOT NULL AND due_date < ")
            .push_bind(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(AssignmentPatch::default().is_empty());
        let patch = AssignmentPatch {
            status: Some("published".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn creator_may_mutate() {
        let creator = Uuid::new_v4();
        assert!(owns_assignment(creator, None, creator));
        assert!(owns_assignment(creator, Some(Uuid::new_v4()), creator));
    }

    #[test]
    fn classroom_teacher_may_mutate() {
        let teacher = Uuid::new_v4();
        assert!(owns_assignment(Uuid::new_v4(), Some(teacher), teacher));
    }

    #[test]
    fn stranger_may_not_mutate() {
        let stranger = Uuid::new_v4();
        assert!(!owns_assignment(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            stranger
        ));
    }

    #[test]
    fn deleted_classroom_leaves_only_the_creator() {
        let actor = Uuid::new_v4();
        assert!(!owns_assignment(Uuid::new_v4(), None, actor));
    }

    #[test]
    fn patch_query_sets_only_present_fields() {
        let patch = AssignmentPatch {
            title: Some("Midterm review".to_string()),
            status: Some("published".to_string()),
            ..Default::default()
        };
        let sql = patch_update_query(Uuid::new_v4(), patch).into_sql();

        assert!(sql.contains("title = "));
        assert!(sql.contains("status = "));
        assert!(sql.contains("updated_at = "));
        assert!(sql.contains("WHERE id = "));
        assert!(!sql.contains("description = "));
        assert!(!sql.contains("max_score = "));
        assert!(!sql.contains("is_published = "));
    }

    #[test]
    fn patch_query_always_stamps_updated_at() {
        let patch = AssignmentPatch {
            weight: Some(2.0),
            ..Default::default()
        };
        let sql = patch_update_query(Uuid::new_v4(), patch).into_sql();
        assert!(sql.contains("weight = $1"));
        assert!(sql.contains("updated_at = $2"));
    }

    #[test]
    fn publish_patch_sets_exactly_two_fields() {
        let patch = AssignmentPatch {
            is_published: Some(true),
            status: Some("published".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(patch.title.is_none());
        assert!(patch.due_date.is_none());
        assert_eq!(patch.status.as_deref(), Some("published"));
        assert_eq!(patch.is_published, Some(true));
    }
}
