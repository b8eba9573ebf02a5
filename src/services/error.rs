use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::tokens::TokenError;

/// Domain errors returned by the resource services.
///
/// These are values, not transport concerns: the HTTP layer owns the
/// kind-to-status mapping in `crate::error`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("unauthorized to {0}")]
    Unauthorized(&'static str),

    /// Missing and foreign parent resources are deliberately
    /// indistinguishable so callers cannot probe for existence.
    #[error("{0} not found or access denied")]
    AccessDenied(&'static str),

    #[error("no data to update")]
    NoOpUpdate,

    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    DependencyConflict(&'static str),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("failed to generate unique classroom code after {0} attempts")]
    CodeGenerationExhausted(u32),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
