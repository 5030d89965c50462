//! Service Model
//!
//! A scheduled church service. Owned by no hierarchy node.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct Service {
    pub id: i64,
    pub name: String,
    /// Service date, `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`
    pub end_time: String,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "startTime is required"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "endTime is required"))]
    pub end_time: String,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub active: Option<bool>,
}
