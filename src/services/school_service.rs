use chrono::Utc;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::School;
use crate::services::error::ServiceError;

const SCHOOL_COLUMNS: &str =
    "id, name, address, phone, email, website_url, logo_url, is_active, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct CreateSchool {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
}

/// Partial update: only fields present in the payload are applied.
#[derive(Debug, Default, Deserialize)]
pub struct SchoolPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
}

impl SchoolPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.website_url.is_none()
    }
}

#[derive(Clone)]
pub struct SchoolService {
    pool: PgPool,
}

impl SchoolService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active schools ordered by name, optionally filtered by a substring
    /// match, capped at 20 rows for the public picker.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<School>, ServiceError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE is_active = true"
        ));
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            qb.push(" AND LOWER(name) LIKE ")
                .push_bind(format!("%{}%", search.to_lowercase()));
        }
        qb.push(" ORDER BY name ASC LIMIT 20");

        let schools: Vec<School> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(schools)
    }

    pub async fn get(&self, id: Uuid) -> Result<School, ServiceError> {
        self.fetch_active(id).await
    }

    /// Create a school. Names are unique case-insensitively.
    pub async fn create(&self, req: CreateSchool) -> Result<School, ServiceError> {
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM schools WHERE LOWER(name) = LOWER($1)")
                .bind(&req.name)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict("school name"));
        }

        let now = Utc::now();
        let school: School = sqlx::query_as(&format!(
            "INSERT INTO schools (id, name, address, phone, email, website_url, is_active, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, true, $7, $7) \
             RETURNING {SCHOOL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.website_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(school)
    }

    /// Apply a partial update and return the fresh row.
    pub async fn update(&self, id: Uuid, patch: SchoolPatch) -> Result<School, ServiceError> {
        self.fetch_active(id).await?;

        if patch.is_empty() {
            return Err(ServiceError::NoOpUpdate);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE schools SET ");
        let mut sets = qb.separated(", ");
        if let Some(v) = patch.name {
            sets.push("name = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.address {
            sets.push("address = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.phone {
            sets.push("phone = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.email {
            sets.push("email = ").push_bind_unseparated(v);
        }
        if let Some(v) = patch.website_url {
            sets.push("website_url = ").push_bind_unseparated(v);
        }
        sets.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;

        self.fetch_active(id).await
    }

    /// Deactivate a school. Blocked while it still has active users.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.fetch_active(id).await?;

        let user_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE school_id = $1 AND is_active = true",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if user_count > 0 {
            return Err(ServiceError::DependencyConflict(
                "cannot delete school that has active users",
            ));
        }

        sqlx::query("UPDATE schools SET is_active = false, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Match an existing active school by name (case-insensitive) or create
    /// a bare one. Used during registration.
    pub async fn find_or_create(&self, name: &str) -> Result<School, ServiceError> {
        let existing: Option<School> = sqlx::query_as(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools \
             WHERE LOWER(name) = LOWER($1) AND is_active = true"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(school) = existing {
            return Ok(school);
        }

        self.create(CreateSchool {
            name: name.to_string(),
            address: None,
            phone: None,
            email: None,
            website_url: None,
        })
        .await
    }

    async fn fetch_active(&self, id: Uuid) -> Result<School, ServiceError> {
        let school: Option<School> = sqlx::query_as(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        school.ok_or(ServiceError::NotFound("school"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(SchoolPatch::default().is_empty());
        let patch = SchoolPatch {
            phone: Some("02-123-4567".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
