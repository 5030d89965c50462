//! Hierarchy Models
//!
//! The three nested levels below Church: Group → PCF → Cell. Each carries
//! an optional `leader_id` referencing a user (relation only, not
//! ownership).

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Church;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub church_id: i64,
    pub leader_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct Pcf {
    pub id: i64,
    pub name: String,
    pub group_id: i64,
    pub leader_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct Cell {
    pub id: i64,
    pub name: String,
    pub pcf_id: i64,
    pub leader_id: Option<String>,
}

/// Create group payload. Leader fields are handled by the assignment
/// workflow, not here.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub church_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PcfCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub group_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PcfUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CellCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub pcf_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
}

/// Full tree returned by GET /api/hierarchy (flattened lists; scope is
/// applied by the caller).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyTree {
    pub church: Option<Church>,
    pub groups: Vec<Group>,
    pub pcfs: Vec<Pcf>,
    pub cells: Vec<Cell>,
}
