use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row in the `genders` lookup table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gender {
    pub id: i32,
    pub code: String,
    pub name_th: String,
    pub name_en: String,
    pub abbreviation: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in the `prefixes` lookup table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Prefix {
    pub id: i32,
    pub code: String,
    pub name_th: String,
    pub name_en: String,
    pub abbreviation: Option<String>,
    pub gender_code: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Prefix with its gender populated.
#[derive(Debug, Clone, Serialize)]
pub struct PrefixDetail {
    #[serde(flatten)]
    pub prefix: Prefix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}
