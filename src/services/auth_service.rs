use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::tokens::{issue_access_token, issue_refresh_token, validate_refresh_token};
use crate::config;
use crate::models::{Gender, Prefix, User};
use crate::services::error::ServiceError;
use crate::services::reference_service::ReferenceService;
use crate::services::school_service::SchoolService;

const USER_COLUMNS: &str = "id, school_id, username, email, password_hash, prefix_id, \
     first_name, last_name, gender_id, role, phone, is_active, email_verified, \
     last_login_at, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub school_name: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SchoolSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LookupSummary {
    pub id: i32,
    pub code: String,
    pub name_th: String,
    pub name_en: String,
    pub abbreviation: Option<String>,
}

impl From<Gender> for LookupSummary {
    fn from(g: Gender) -> Self {
        Self {
            id: g.id,
            code: g.code,
            name_th: g.name_th,
            name_en: g.name_en,
            abbreviation: g.abbreviation,
        }
    }
}

impl From<Prefix> for LookupSummary {
    fn from(p: Prefix) -> Self {
        Self {
            id: p.id,
            code: p.code,
            name_th: p.name_th,
            name_en: p.name_en,
            abbreviation: p.abbreviation,
        }
    }
}

/// Account block returned alongside tokens.
#[derive(Debug, Serialize)]
pub struct AuthUserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: String,
    pub school_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<SchoolSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<LookupSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<LookupSummary>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: AuthUserInfo,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    schools: SchoolService,
    references: ReferenceService,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        let schools = SchoolService::new(pool.clone());
        let references = ReferenceService::new(pool.clone());
        Self {
            pool,
            schools,
            references,
        }
    }

    /// Verify credentials and issue a token pair.
    ///
    /// A missing account and a wrong password produce the same error.
    pub async fn login(&self, req: LoginRequest) -> Result<TokenResponse, ServiceError> {
        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(&req.email)
        .fetch_optional(&self.pool)
        .await?;

        let user = user.ok_or(ServiceError::InvalidCredentials)?;
        if !verify_password(&req.password, &user.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        // A failed stamp must not fail the login
        if let Err(err) = sqlx::query("UPDATE users SET last_login_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user.id)
            .execute(&self.pool)
            .await
        {
            tracing::warn!(user_id = %user.id, "failed to stamp last login: {}", err);
        }

        self.token_response(user).await
    }

    /// Create an account, reusing or creating its school by name.
    pub async fn register(&self, req: RegisterRequest) -> Result<TokenResponse, ServiceError> {
        if req.password != req.confirm_password {
            return Err(ServiceError::Validation(
                "password confirmation does not match",
            ));
        }

        let email_taken: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
                .bind(&req.email)
                .fetch_optional(&self.pool)
                .await?;
        if email_taken.is_some() {
            return Err(ServiceError::Conflict("email"));
        }

        let username_taken: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
                .bind(&req.username)
                .fetch_optional(&self.pool)
                .await?;
        if username_taken.is_some() {
            return Err(ServiceError::Conflict("username"));
        }

        let school = self.schools.find_or_create(&req.school_name).await?;
        let password_hash = hash_password(&req.password)?;

        // Unknown lookup names are skipped rather than rejected
        let gender_id = match req.gender.as_deref() {
            Some(name) => {
                let id = self.references.find_gender_id_by_name(name).await?;
                if id.is_none() {
                    tracing::warn!(gender = name, "unknown gender name, skipping");
                }
                id
            }
            None => None,
        };
        let prefix_id = match req.prefix.as_deref() {
            Some(name) => {
                let id = self.references.find_prefix_id_by_name(name).await?;
                if id.is_none() {
                    tracing::warn!(prefix = name, "unknown prefix name, skipping");
                }
                id
            }
            None => None,
        };

        let now = Utc::now();
        let user: User = sqlx::query_as(&format!(
            "INSERT INTO users \
             (id, school_id, username, email, password_hash, prefix_id, first_name, last_name, \
              gender_id, role, phone, is_active, email_verified, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, true, false, $12, $12) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(school.id)
        .bind(&req.username)
        .bind(&req.email)
        .bind(&password_hash)
        .bind(prefix_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(gender_id)
        .bind(&req.role)
        .bind(&req.phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.token_response(user).await
    }

    /// Exchange a valid refresh token for a fresh access token.
    pub async fn refresh(&self, req: RefreshRequest) -> Result<RefreshResponse, ServiceError> {
        let security = &config::config().security;
        let claims = validate_refresh_token(&req.refresh_token, security)
            .map_err(|_| ServiceError::InvalidToken)?;

        let user: Option<User> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = true"
        ))
        .bind(claims.user_id)
        .fetch_optional(&self.pool)
        .await?;
        let user = user.ok_or(ServiceError::InvalidToken)?;

        let access_token = issue_access_token(user.id, &user.email, &user.role, security)?;
        Ok(RefreshResponse {
            access_token,
            token_type: "Bearer",
            expires_in: security.access_token_expiry_secs,
        })
    }

    async fn token_response(&self, user: User) -> Result<TokenResponse, ServiceError> {
        let security = &config::config().security;
        let access_token = issue_access_token(user.id, &user.email, &user.role, security)?;
        let refresh_token = issue_refresh_token(user.id, security)?;

        let school = match user.school_id {
            Some(school_id) => sqlx::query_as::<_, (Uuid, String)>(
                "SELECT id, name FROM schools WHERE id = $1",
            )
            .bind(school_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|(id, name)| SchoolSummary { id, name }),
            None => None,
        };

        let prefix = match user.prefix_id {
            Some(prefix_id) => match self.references.get_prefix(prefix_id).await {
                Ok(detail) => Some(LookupSummary::from(detail.prefix)),
                Err(ServiceError::NotFound(_)) => None,
                Err(other) => return Err(other),
            },
            None => None,
        };

        let gender = match user.gender_id {
            Some(gender_id) => match self.references.get_gender(gender_id).await {
                Ok(gender) => Some(LookupSummary::from(gender)),
                Err(ServiceError::NotFound(_)) => None,
                Err(other) => return Err(other),
            },
            None => None,
        };

        let full_name = user.full_name();
        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: security.access_token_expiry_secs,
            user: AuthUserInfo {
                id: user.id,
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                full_name,
                role: user.role,
                school_id: user.school_id,
                is_active: user.is_active,
                created_at: user.created_at,
                school,
                prefix,
                gender,
            },
        })
    }
}
