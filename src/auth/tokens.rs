use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims embedded in access tokens: identity plus role and email so
/// protected handlers never re-read the user for authorization context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Refresh tokens carry only the subject id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub user_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("JWT secret not configured")]
    MissingSecret,
}

impl AccessClaims {
    pub fn new(user_id: Uuid, email: String, role: String, expiry_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email,
            role,
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, expiry_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Issue a signed HS256 access token.
pub fn issue_access_token(
    user_id: Uuid,
    email: &str,
    role: &str,
    security: &SecurityConfig,
) -> Result<String, TokenError> {
    let claims = AccessClaims::new(
        user_id,
        email.to_string(),
        role.to_string(),
        security.access_token_expiry_secs,
    );
    sign(&claims, security)
}

/// Issue a signed HS256 refresh token.
pub fn issue_refresh_token(user_id: Uuid, security: &SecurityConfig) -> Result<String, TokenError> {
    let claims = RefreshClaims::new(user_id, security.refresh_token_expiry_secs);
    sign(&claims, security)
}

fn sign<C: Serialize>(claims: &C, security: &SecurityConfig) -> Result<String, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &key).map_err(|e| TokenError::Invalid(e.to_string()))
}

/// Decode and verify an access token.
pub fn validate_access_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<AccessClaims, TokenError> {
    verify::<AccessClaims>(token, security)
}

/// Decode and verify a refresh token.
pub fn validate_refresh_token(
    token: &str,
    security: &SecurityConfig,
) -> Result<RefreshClaims, TokenError> {
    verify::<RefreshClaims>(token, security)
}

fn verify<C: for<'de> Deserialize<'de>>(
    token: &str,
    security: &SecurityConfig,
) -> Result<C, TokenError> {
    if security.jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }
    let key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::default();

    decode::<C>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_security() -> SecurityConfig {
        SecurityConfig {
            enable_cors: true,
            cors_origins: vec![],
            jwt_secret: "test-secret".to_string(),
            access_token_expiry_secs: 60,
            refresh_token_expiry_secs: 3600,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let security = test_security();
        let user_id = Uuid::new_v4();
        let token =
            issue_access_token(user_id, "t1@example.com", "teacher", &security).unwrap();

        let claims = validate_access_token(&token, &security).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "t1@example.com");
        assert_eq!(claims.role, "teacher");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_carries_only_subject() {
        let security = test_security();
        let user_id = Uuid::new_v4();
        let token = issue_refresh_token(user_id, &security).unwrap();

        let claims = validate_refresh_token(&token, &security).unwrap();
        assert_eq!(claims.user_id, user_id);
        // A refresh token must not validate as an access token
        assert!(validate_access_token(&token, &security).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let security = test_security();
        let token =
            issue_access_token(Uuid::new_v4(), "a@b.c", "student", &security).unwrap();

        let mut other = test_security();
        other.jwt_secret = "different-secret".to_string();
        assert!(matches!(
            validate_access_token(&token, &other),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_tagged_expired() {
        let mut security = test_security();
        security.access_token_expiry_secs = -60;
        let token =
            issue_access_token(Uuid::new_v4(), "a@b.c", "student", &security).unwrap();

        assert!(matches!(
            validate_access_token(&token, &security),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        let mut security = test_security();
        security.jwt_secret = String::new();
        assert!(matches!(
            issue_access_token(Uuid::new_v4(), "a@b.c", "student", &security),
            Err(TokenError::MissingSecret)
        ));
    }
}
