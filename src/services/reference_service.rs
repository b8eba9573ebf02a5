use sqlx::PgPool;

use crate::models::{Gender, Prefix, PrefixDetail};
use crate::services::error::ServiceError;

const GENDER_COLUMNS: &str =
    "id, code, name_th, name_en, abbreviation, is_active, sort_order, created_at, updated_at";

const PREFIX_COLUMNS: &str = "id, code, name_th, name_en, abbreviation, gender_code, \
     is_active, sort_order, created_at, updated_at";

/// Read-only lookups over the `genders` and `prefixes` tables.
#[derive(Clone)]
pub struct ReferenceService {
    pool: PgPool,
}

impl ReferenceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_genders(&self) -> Result<Vec<Gender>, ServiceError> {
        let genders: Vec<Gender> = sqlx::query_as(&format!(
            "SELECT {GENDER_COLUMNS} FROM genders WHERE is_active = true ORDER BY sort_order ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(genders)
    }

    pub async fn get_gender(&self, id: i32) -> Result<Gender, ServiceError> {
        let gender: Option<Gender> = sqlx::query_as(&format!(
            "SELECT {GENDER_COLUMNS} FROM genders WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        gender.ok_or(ServiceError::NotFound("gender"))
    }

    /// Active prefixes with their gender populated.
    pub async fn list_prefixes(&self) -> Result<Vec<PrefixDetail>, ServiceError> {
        let prefixes: Vec<Prefix> = sqlx::query_as(&format!(
            "SELECT {PREFIX_COLUMNS} FROM prefixes WHERE is_active = true ORDER BY sort_order ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let genders = self.list_genders().await?;
        Ok(prefixes
            .into_iter()
            .map(|prefix| {
                let gender = prefix
                    .gender_code
                    .as_deref()
                    .and_then(|code| genders.iter().find(|g| g.code == code).cloned());
                PrefixDetail { prefix, gender }
            })
            .collect())
    }

    pub async fn get_prefix(&self, id: i32) -> Result<PrefixDetail, ServiceError> {
        let prefix: Option<Prefix> = sqlx::query_as(&format!(
            "SELECT {PREFIX_COLUMNS} FROM prefixes WHERE id = $1 AND is_active = true"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let prefix = prefix.ok_or(ServiceError::NotFound("prefix"))?;

        let gender = match prefix.gender_code.as_deref() {
            Some(code) => {
                sqlx::query_as::<_, Gender>(&format!(
                    "SELECT {GENDER_COLUMNS} FROM genders WHERE code = $1 AND is_active = true"
                ))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        Ok(PrefixDetail { prefix, gender })
    }

    /// Prefixes valid for a gender: those tied to its code plus neutral ones.
    pub async fn list_prefixes_by_gender(
        &self,
        gender_code: &str,
    ) -> Result<Vec<Prefix>, ServiceError> {
        let prefixes: Vec<Prefix> = sqlx::query_as(&format!(
            "SELECT {PREFIX_COLUMNS} FROM prefixes \
             WHERE is_active = true AND (gender_code = $1 OR gender_code IS NULL) \
             ORDER BY sort_order ASC"
        ))
        .bind(gender_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(prefixes)
    }

    /// Resolve a gender by display name in either language. Returns None on
    /// no match so callers can decide whether to skip or fail.
    pub async fn find_gender_id_by_name(&self, name: &str) -> Result<Option<i32>, ServiceError> {
        let id: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM genders \
             WHERE is_active = true AND (name_th = $1 OR name_en = $1 OR LOWER(name_en) = LOWER($1)) \
             LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Resolve a prefix by display name or abbreviation in either language.
    pub async fn find_prefix_id_by_name(&self, name: &str) -> Result<Option<i32>, ServiceError> {
        let id: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM prefixes \
             WHERE is_active = true AND (name_th = $1 OR name_en = $1 \
                OR LOWER(name_en) = LOWER($1) OR abbreviation = $1) \
             LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }
}
