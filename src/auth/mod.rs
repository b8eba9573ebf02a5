pub mod password;
pub mod tokens;

pub use tokens::{AccessClaims, RefreshClaims, TokenError};
