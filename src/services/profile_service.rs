use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Gender, Prefix, School, User, UserProfile};
use crate::services::auth_service::{LookupSummary, SchoolSummary};
use crate::services::error::ServiceError;
use crate::services::reference_service::ReferenceService;

const USER_COLUMNS: &str = "id, school_id, username, email, password_hash, prefix_id, \
     first_name, last_name, gender_id, role, phone, is_active, email_verified, \
     last_login_at, created_at, updated_at";

const SCHOOL_COLUMNS: &str =
    "id, name, address, phone, email, website_url, logo_url, is_active, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, user_id, full_name, phone_number, date_of_birth, address, \
     city, state, postal_code, country, bio, website, profile_picture, created_at, updated_at";

/// The caller's account with its lookups and extended profile resolved.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<School>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Prefix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Public projection of another user's profile: no email, phone, address
/// or account flags.
#[derive(Debug, Serialize)]
pub struct PublicProfileView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    pub created_at: chrono::DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<LookupSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<LookupSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<SchoolSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<PublicProfileInfo>,
}

/// The shareable subset of the `user_profiles` row.
#[derive(Debug, Serialize)]
pub struct PublicProfileInfo {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub profile_picture: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

impl From<UserProfile> for PublicProfileInfo {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            full_name: p.full_name,
            bio: p.bio,
            website: p.website,
            profile_picture: p.profile_picture,
            city: p.city,
            country: p.country,
        }
    }
}

/// Partial profile update. Name fields land on the user row, the rest on
/// the `user_profiles` row. `prefix` and `gender` are display names and are
/// resolved against the lookup tables.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub prefix: Option<String>,
    pub gender: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub profile_picture: Option<String>,
}

impl ProfileUpdate {
    fn has_user_fields(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.prefix.is_some()
            || self.gender.is_some()
    }

    fn has_profile_fields(&self) -> bool {
        self.full_name.is_some()
            || self.phone_number.is_some()
            || self.date_of_birth.is_some()
            || self.address.is_some()
            || self.city.is_some()
            || self.state.is_some()
            || self.postal_code.is_some()
            || self.country.is_some()
            || self.bio.is_some()
            || self.website.is_some()
            || self.profile_picture.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_user_fields() && !self.has_profile_fields()
    }
}

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
    references: ReferenceService,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        let references = ReferenceService::new(pool.clone());
        Self { pool, references }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<ProfileView, ServiceError> {
        let user = self.fetch_user(user_id).await?;
        self.load_view(user).await
    }

    /// Public-only projection of another user, for the open profile route.
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<PublicProfileView, ServiceError> {
        let user = self.fetch_user(user_id).await?;
        let view = self.load_view(user).await?;

        let full_name = view.user.full_name();
        Ok(PublicProfileView {
            id: view.user.id,
            username: view.user.username,
            first_name: view.user.first_name,
            last_name: view.user.last_name,
            full_name,
            role: view.user.role,
            created_at: view.user.created_at,
            prefix: view.prefix.map(LookupSummary::from),
            gender: view.gender.map(LookupSummary::from),
            school: view.school.map(|s| SchoolSummary {
                id: s.id,
                name: s.name,
            }),
            profile: view.profile.map(PublicProfileInfo::from),
        })
    }

    /// Apply a partial update across the user row and the profile row,
    /// creating the profile row on first use.
    pub async fn update(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<ProfileView, ServiceError> {
        self.fetch_user(user_id).await?;

        if update.is_empty() {
            return Err(ServiceError::NoOpUpdate);
        }

        if update.has_user_fields() {
            self.apply_user_fields(user_id, &update).await?;
        }
        if update.has_profile_fields() {
            self.apply_profile_fields(user_id, &update).await?;
        }

        let user = self.fetch_user(user_id).await?;
        self.load_view(user).await
    }

    async fn apply_user_fields(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<(), ServiceError> {
        let prefix_id = match update.prefix.as_deref() {
            Some(name) => {
                let id = self.references.find_prefix_id_by_name(name).await?;
                if id.is_none() {
                    tracing::warn!(prefix = name, "unknown prefix name, skipping");
                }
                id
            }
            None => None,
        };
        let gender_id = match update.gender.as_deref() {
            Some(name) => {
                let id = self.references.find_gender_id_by_name(name).await?;
                if id.is_none() {
                    tracing::warn!(gender = name, "unknown gender name, skipping");
                }
                id
            }
            None => None,
        };

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut sets = qb.separated(", ");
        if let Some(v) = update.first_name.as_deref() {
            sets.push("first_name = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.last_name.as_deref() {
            sets.push("last_name = ").push_bind_unseparated(v.to_string());
        }
        if let Some(id) = prefix_id {
            sets.push("prefix_id = ").push_bind_unseparated(id);
        }
        if let Some(id) = gender_id {
            sets.push("gender_id = ").push_bind_unseparated(id);
        }
        sets.push("updated_at = ").push_bind_unseparated(Utc::now());
        qb.push(" WHERE id = ").push_bind(user_id);
        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn apply_profile_fields(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<(), ServiceError> {
        let now = Utc::now();
        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let profile_id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    "INSERT INTO user_profiles (id, user_id, created_at, updated_at) \
                     VALUES ($1, $2, $3, $3)",
                )
                .bind(id)
                .bind(user_id)
                .bind(now)
                .execute(&self.pool)
                .await?;
                id
            }
        };

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE user_profiles SET ");
        let mut sets = qb.separated(", ");
        if let Some(v) = update.full_name.as_deref() {
            sets.push("full_name = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.phone_number.as_deref() {
            sets.push("phone_number = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.date_of_birth {
            sets.push("date_of_birth = ").push_bind_unseparated(v);
        }
        if let Some(v) = update.address.as_deref() {
            sets.push("address = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.city.as_deref() {
            sets.push("city = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.state.as_deref() {
            sets.push("state = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.postal_code.as_deref() {
            sets.push("postal_code = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.country.as_deref() {
            sets.push("country = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.bio.as_deref() {
            sets.push("bio = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.website.as_deref() {
            sets.push("website = ").push_bind_unseparated(v.to_string());
        }
        if let Some(v) = update.profile_picture.as_deref() {
            sets.push("profile_picture = ").push_bind_unseparated(v.to_string());
        }
        sets.push("updated_at = ").push_bind_unseparated(now);
        qb.push(" WHERE id = ").push_bind(profile_id);
        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn fetch_user(&self, user_id: Uuid) -> Result<User, ServiceError> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = true"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or(ServiceError::NotFound("user"))
    }

    async fn load_view(&self, user: User) -> Result<ProfileView, ServiceError> {
        let school = match user.school_id {
            Some(school_id) => {
                sqlx::query_as::<_, School>(&format!(
                    "SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1"
                ))
                .bind(school_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        let prefix = match user.prefix_id {
            Some(prefix_id) => self
                .references
                .get_prefix(prefix_id)
                .await
                .map(|detail| Some(detail.prefix))
                .or_else(|err| match err {
                    ServiceError::NotFound(_) => Ok(None),
                    other => Err(other),
                })?,
            None => None,
        };

        let gender = match user.gender_id {
            Some(gender_id) => self
                .references
                .get_gender(gender_id)
                .await
                .map(Some)
                .or_else(|err| match err {
                    ServiceError::NotFound(_) => Ok(None),
                    other => Err(other),
                })?,
            None => None,
        };

        let profile: Option<UserProfile> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ProfileView {
            user,
            school,
            prefix,
            gender,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_detected() {
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn public_view_exposes_no_private_fields() {
        let view = PublicProfileView {
            id: Uuid::new_v4(),
            username: "somchai".to_string(),
            first_name: "Somchai".to_string(),
            last_name: "J".to_string(),
            full_name: "Somchai J".to_string(),
            role: "teacher".to_string(),
            created_at: Utc::now(),
            prefix: None,
            gender: None,
            school: None,
            profile: Some(PublicProfileInfo {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                full_name: None,
                bio: Some("teaches physics".to_string()),
                website: None,
                profile_picture: None,
                city: Some("Bangkok".to_string()),
                country: None,
            }),
        };

        let body = serde_json::to_string(&view).unwrap();
        assert!(!body.contains("email"));
        assert!(!body.contains("phone"));
        assert!(!body.contains("address"));
        assert!(!body.contains("date_of_birth"));
        assert!(body.contains("username"));
    }

    #[test]
    fn name_fields_target_the_user_row() {
        let update = ProfileUpdate {
            first_name: Some("Ada".to_string()),
            ..Default::default()
        };
        assert!(update.has_user_fields());
        assert!(!update.has_profile_fields());
    }

    #[test]
    fn bio_targets_the_profile_row() {
        let update = ProfileUpdate {
            bio: Some("teaches physics".to_string()),
            ..Default::default()
        };
        assert!(!update.has_user_fields());
        assert!(update.has_profile_fields());
    }
}
