//! User Model
//!
//! A user is a login principal. Its `role` plus scope pointers
//! (`group_id` / `pcf_id` / `cell_id`) determine what it may see and
//! mutate; the leadership assignment workflow is the only writer of
//! role+scope combinations.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::{Role, ScopeField};

/// User entity. `password` is an argon2 hash and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub title: Option<String>,
    pub group_id: Option<i64>,
    pub pcf_id: Option<i64>,
    pub cell_id: Option<i64>,
    pub member_id: Option<i64>,
    pub force_password_change: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Whether the role's required scope pointer is present. Leadership
    /// roles with a missing pointer are inert and indicate a bookkeeping
    /// bug in whatever wrote the row.
    pub fn scope_is_consistent(&self) -> bool {
        match self.role.expected_scope() {
            ScopeField::None => true,
            ScopeField::GroupId => self.group_id.is_some(),
            ScopeField::PcfId => self.pcf_id.is_some(),
            ScopeField::CellId => self.cell_id.is_some(),
        }
    }
}

/// User without credential material, safe to return from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub title: Option<String>,
    pub group_id: Option<i64>,
    pub pcf_id: Option<i64>,
    pub cell_id: Option<i64>,
    pub member_id: Option<i64>,
    pub force_password_change: bool,
}

impl From<User> for SafeUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            title: u.title,
            group_id: u.group_id,
            pcf_id: u.pcf_id,
            cell_id: u.cell_id,
            member_id: u.member_id,
            force_password_change: u.force_password_change,
        }
    }
}

/// Login request: email or username plus password.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email or username is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: SafeUser,
}

/// Self-service password change.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "currentPassword is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "newPassword must be at least 8 characters"))]
    pub new_password: String,
}

/// Provision a login for an existing member (admin/group_pastor only).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConvertMemberRequest {
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

/// One-time credentials returned when the workflow provisions a user.
/// The password is stored only as a hash and never retrievable again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaderCredentials {
    pub email: String,
    pub temp_password: String,
    pub must_change_password: bool,
}
