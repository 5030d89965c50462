//! Church Model

use serde::{Deserialize, Serialize};

/// Root organizational unit. One row per deployment in practice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct Church {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub created_at: i64,
}
