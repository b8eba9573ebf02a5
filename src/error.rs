// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::error::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the `{status: {code, message}}` envelope body
    pub fn to_json(&self) -> Value {
        json!({
            "status": {
                "code": self.status_code(),
                "message": self.message(),
            }
        })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Domain errors carry the kind; this is the only place the HTTP
// semantics for each kind are decided.
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => ApiError::not_found(err.to_string()),
            ServiceError::Unauthorized(_) => ApiError::Unauthorized(err.to_string()),
            ServiceError::AccessDenied(_) => ApiError::Forbidden(err.to_string()),
            ServiceError::NoOpUpdate => ApiError::bad_request(err.to_string()),
            ServiceError::Validation(msg) => ApiError::bad_request(msg),
            ServiceError::DependencyConflict(msg) => ApiError::Conflict(msg.to_string()),
            ServiceError::Conflict(_) => ApiError::conflict(err.to_string()),
            ServiceError::CodeGenerationExhausted(_) => {
                tracing::error!("classroom code generation exhausted: {}", err);
                ApiError::internal_server_error(err.to_string())
            }
            ServiceError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            ServiceError::InvalidToken => ApiError::unauthorized(err.to_string()),
            ServiceError::Token(token_err) => match token_err {
                crate::auth::tokens::TokenError::Expired => {
                    ApiError::unauthorized("Token expired")
                }
                crate::auth::tokens::TokenError::Invalid(_) => {
                    ApiError::unauthorized("Invalid or expired token")
                }
                crate::auth::tokens::TokenError::MissingSecret => {
                    tracing::error!("token error: {}", token_err);
                    ApiError::internal_server_error(
                        "An error occurred while processing your request",
                    )
                }
            },
            ServiceError::Password(pw_err) => {
                tracing::error!("password error: {}", pw_err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            ServiceError::Database(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("database error: {}", sqlx_err);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_kinds_map_to_expected_statuses() {
        let cases: Vec<(ServiceError, u16)> = vec![
            (ServiceError::NotFound("classroom"), 404),
            (ServiceError::Unauthorized("update this classroom"), 401),
            (ServiceError::AccessDenied("classroom"), 403),
            (ServiceError::NoOpUpdate, 400),
            (
                ServiceError::DependencyConflict("cannot delete classroom with active students"),
                409,
            ),
            (ServiceError::CodeGenerationExhausted(10), 500),
            (ServiceError::Database(sqlx::Error::PoolClosed), 500),
        ];

        for (err, expected) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), expected);
        }
    }

    #[test]
    fn database_errors_never_leak_detail() {
        let api: ApiError = ServiceError::Database(sqlx::Error::PoolClosed).into();
        assert!(!api.message().to_lowercase().contains("pool"));
    }

    #[test]
    fn envelope_carries_code_and_message() {
        let body = ApiError::not_found("classroom not found").to_json();
        assert_eq!(body["status"]["code"], 404);
        assert_eq!(body["status"]["message"], "classroom not found");
    }
}
