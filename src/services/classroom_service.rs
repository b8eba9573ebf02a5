use std::future::Future;

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Classroom, ClassroomDetail, EnrolledStudent, School, UserPublic};
use crate::services::error::ServiceError;
use crate::services::pagination::PageParams;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;
const CODE_MAX_ATTEMPTS: u32 = 10;

const CLASSROOM_COLUMNS: &str = "id, school_id, name, subject, description, grade_level, \
     section, room_number, teacher_id, classroom_code, max_students, schedule, is_active, \
     created_at, updated_at, deleted_at";

#[derive(Debug, Deserialize)]
pub struct CreateClassroom {
    pub school_id: Option<Uuid>,
    pub name: String,
    pub subject: String,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    pub section: Option<String>,
    pub room_number: Option<String>,
    pub max_students: Option<i32>,
    pub schedule: Option<serde_json::Value>,
}

/// Partial update: only fields present in the payload are applied.
#[derive(Debug, Default, Deserialize)]
pub struct ClassroomPatch {
    pub school_id: Option<Uuid>,
    pub name: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub grade_level: Option<String>,
    pub section: Option<String>,
    pub room_number: Option<String>,
    pub max_students: Option<i32>,
    pub schedule: Option<serde_json::Value>,
    pub is_active: Option<bool>,
}

impl ClassroomPatch {
    pub fn is_empty(&self) -> bool {
        self.school_id.is_none()
            && self.name.is_none()
            && self.subject.is_none()
            && self.description.is_none()
            && self.grade_level.is_none()
            && self.section.is_none()
            && self.room_number.is_none()
            && self.max_students.is_none()
            && self.schedule.is_none()
            && self.is_active.is_none()
    }
}

/// Optional AND-combined listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ClassroomFilter {
    pub search: Option<String>,
    pub school_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct ClassroomService {
    pool: PgPool,
}

impl ClassroomService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a classroom owned by the acting teacher, with a freshly
    /// generated unique classroom code.
    pub async fn create(
        &self,
        req: CreateClassroom,
        teacher_id: Uuid,
    ) -> Result<ClassroomDetail, ServiceError> {
        let pool = self.pool.clone();
        let code = generate_unique_code(move |code| {
            let pool = pool.clone();
            async move {
                let count: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM classrooms \
                     WHERE classroom_code = $1 AND deleted_at IS NULL",
                )
                .bind(code)
                .fetch_one(&pool)
                .await?;
                Ok(count > 0)
            }
        })
        .await?;

        let now = Utc::now();
        let classroom: Classroom = sqlx::query_as(&format!(
            "INSERT INTO classrooms \
             (id, school_id, name, subject, description, grade_level, section, room_number, \
              teacher_id, classroom_code, max_students, schedule, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, true, $13, $13) \
             RETURNING {CLASSROOM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(req.school_id)
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.description)
        .bind(&req.grade_level)
        .bind(&req.section)
        .bind(&req.room_number)
        .bind(teacher_id)
        .bind(&code)
        .bind(req.max_students.unwrap_or(50))
        .bind(&req.schedule)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.load_detail(classroom, false).await
    }

    /// List live classrooms with filters and pagination, newest first.
    pub async fn list(
        &self,
        filter: &ClassroomFilter,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Classroom>, i64), ServiceError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM classrooms WHERE deleted_at IS NULL");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms WHERE deleted_at IS NULL"
        ));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(PageParams::offset(page, limit));

        let classrooms: Vec<Classroom> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok((classrooms, total))
    }

    /// Get a live classroom by id, with relations and enrolled students.
    pub async fn get(&self, id: Uuid) -> Result<ClassroomDetail, ServiceError> {
        let classroom = self.fetch_live(id).await?;
        self.load_detail(classroom, true).await
    }

    /// Get a live classroom by its classroom code.
    pub async fn get_by_code(&self, code: &str) -> Result<ClassroomDetail, ServiceError> {
        let classroom: Option<Classroom> = sqlx::query_as(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms \
             WHERE classroom_code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        let classroom = classroom.ok_or(ServiceError::NotFound("classroom"))?;
        self.load_detail(classroom, false).await
    }

    /// Apply a partial update. Only the classroom's teacher may mutate it.
    pub async fn update(
        &self,
        id: Uuid,
        patch: ClassroomPatch,
        actor_id: Uuid,
    ) -> Result<ClassroomDetail, ServiceError> {
        let classroom = self.fetch_live(id).await?;

        if classroom.teacher_id != actor_id {
            return Err(ServiceError::Unauthorized("update this classroom"));
        }

        if patch.is_empty() {
            return Err(ServiceError::NoOpUpdate);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE classrooms SET ");
        let mut sets = qb.separated(", ");
        if let Some(v) = patch.school_id {
            sets.push("school_id = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.name {
            sets.push("name = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.subject {
            sets.push("subject = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.description {
            sets.push("description = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.grade_level {
            sets.push("grade_level = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.section {
            sets.push("section = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.room_number {
            sets.push("room_number = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.max_students {
            sets.push("max_students = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.schedule {
            sets.push("schedule = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.is_active {
            sets.push("is_active = ").push_bind_unseparated(v);
        }
        sets.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;

        // Return the post-update relational state, not just the patch
        let classroom = self.fetch_live(id).await?;
        self.load_detail(classroom, false).await
    }

    /// Soft delete. Blocked while the classroom has active students.
    pub async fn delete(&self, id: Uuid, actor_id: Uuid) -> Result<(), ServiceError> {
        let classroom = self.fetch_live(id).await?;

        if classroom.teacher_id != actor_id {
            return Err(ServiceError::Unauthorized("delete this classroom"));
        }

        let student_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM classroom_students \
             WHERE classroom_id = $1 AND is_active = true",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if student_count > 0 {
            return Err(ServiceError::DependencyConflict(
                "cannot delete classroom with active students",
            ));
        }

        sqlx::query("UPDATE classrooms SET deleted_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_live(&self, id: Uuid) -> Result<Classroom, ServiceError> {
        let classroom: Option<Classroom> = sqlx::query_as(&format!(
            "SELECT {CLASSROOM_COLUMNS} FROM classrooms \
             WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        classroom.ok_or(ServiceError::NotFound("classroom"))
    }

    async fn load_detail(
        &self,
        classroom: Classroom,
        include_students: bool,
    ) -> Result<ClassroomDetail, ServiceError> {
        let school: Option<School> = match classroom.school_id {
            Some(school_id) => {
                sqlx::query_as("SELECT * FROM schools WHERE id = $1")
                    .bind(school_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let teacher: Option<UserPublic> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, email, role FROM users WHERE id = $1",
        )
        .bind(classroom.teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        let students = if include_students {
            let rows: Vec<EnrolledStudent> = sqlx::query_as(
                "SELECT cs.id, cs.student_id, cs.student_number, cs.seat_number, \
                        cs.enrolled_at, cs.is_active, u.username, u.first_name, u.last_name \
                 FROM classroom_students cs \
                 JOIN users u ON u.id = cs.student_id \
                 WHERE cs.classroom_id = $1 AND cs.is_active = true \
                 ORDER BY cs.enrolled_at ASC",
            )
            .bind(classroom.id)
            .fetch_all(&self.pool)
            .await?;
            Some(rows)
        } else {
            None
        };

        Ok(ClassroomDetail {
            classroom,
            school,
            teacher,
            students,
        })
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ClassroomFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let term = format!("%{}%", search.to_lowercase());
        qb.push(" AND (LOWER(name) LIKE ")
            .push_bind(term.clone())
            .push(" OR LOWER(subject) LIKE ")
            .push_bind(term.clone())
            .push(" OR LOWER(classroom_code) LIKE ")
            .push_bind(term)
            .push(")");
    }
    if let Some(school_id) = filter.school_id {
        qb.push(" AND school_id = ").push_bind(school_id);
    }
    if let Some(teacher_id) = filter.teacher_id {
        qb.push(" AND teacher_id = ").push_bind(teacher_id);
    }
    if let Some(subject) = filter.subject.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND LOWER(subject) = LOWER(")
            .push_bind(subject.to_string())
            .push(")");
    }
    if let Some(grade_level) = filter.grade_level.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND grade_level = ").push_bind(grade_level.to_string());
    }
    if let Some(is_active) = filter.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
}

/// Draw a random code from the fixed alphabet.
fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Generate a classroom code that the `exists` check does not know yet.
///
/// Bounded retry: after `CODE_MAX_ATTEMPTS` collisions the whole create
/// fails rather than looping forever. Two concurrent creates can still both
/// pass the check; the store's uniqueness constraint rejects the loser.
async fn generate_unique_code<F, Fut>(mut exists: F) -> Result<String, ServiceError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, ServiceError>>,
{
    for _ in 0..CODE_MAX_ATTEMPTS {
        let code = random_code();
        if !exists(code.clone()).await? {
            return Ok(code);
        }
    }
    Err(ServiceError::CodeGenerationExhausted(CODE_MAX_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_codes_use_fixed_alphabet_and_length() {
        for _ in 0..1000 {
            let code = random_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[tokio::test]
    async fn unique_code_returned_when_free() {
        let code = generate_unique_code(|_| async { Ok(false) }).await.unwrap();
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn retries_until_a_free_code_is_found() {
        let mut attempts = 0;
        let code = generate_unique_code(|_| {
            attempts += 1;
            let taken = attempts < 3;
            async move { Ok(taken) }
        })
        .await
        .unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(code.len(), CODE_LENGTH);
    }

    #[tokio::test]
    async fn gives_up_after_ten_collisions() {
        let mut attempts = 0;
        let mut seen = HashSet::new();
        let err = generate_unique_code(|code| {
            attempts += 1;
            seen.insert(code);
            async { Ok(true) }
        })
        .await
        .unwrap_err();

        assert_eq!(attempts, 10);
        assert!(matches!(err, ServiceError::CodeGenerationExhausted(10)));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ClassroomPatch::default().is_empty());
        let patch = ClassroomPatch {
            max_students: Some(30),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
