//! Member Model
//!
//! A member is a person in the directory, independent of having login
//! credentials. A member may be linked to at most one user account.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::Designation;

/// Member status. Deletion is a hard delete; this flag covers members who
/// left but should stay on record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum MemberStatus {
    Active,
    Inactive,
}

/// Member entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub title: Option<String>,
    pub designation: Designation,
    pub birth_day: Option<i64>,
    pub birth_month: Option<i64>,
    pub status: MemberStatus,
    pub cell_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Member {
    /// First name, by splitting the full name on the first space.
    pub fn first_name(&self) -> &str {
        self.full_name
            .split_once(' ')
            .map(|(first, _)| first)
            .unwrap_or(&self.full_name)
    }

    /// Everything after the first space; empty for single-word names.
    pub fn last_name(&self) -> &str {
        self.full_name
            .split_once(' ')
            .map(|(_, rest)| rest)
            .unwrap_or("")
    }
}

/// Create member payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberCreate {
    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub gender: Option<String>,
    pub title: Option<String>,
    pub designation: Option<Designation>,
    #[validate(range(min = 1, max = 31, message = "birthDay must be 1-31"))]
    pub birth_day: Option<i64>,
    #[validate(range(min = 1, max = 12, message = "birthMonth must be 1-12"))]
    pub birth_month: Option<i64>,
    pub status: Option<MemberStatus>,
    pub cell_id: Option<i64>,
}

/// Update member payload (all fields optional)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    pub gender: Option<String>,
    pub title: Option<String>,
    pub designation: Option<Designation>,
    #[validate(range(min = 1, max = 31, message = "birthDay must be 1-31"))]
    pub birth_day: Option<i64>,
    #[validate(range(min = 1, max = 12, message = "birthMonth must be 1-12"))]
    pub birth_month: Option<i64>,
    pub status: Option<MemberStatus>,
    pub cell_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(full_name: &str) -> Member {
        Member {
            id: 1,
            full_name: full_name.to_string(),
            phone: None,
            email: None,
            gender: None,
            title: None,
            designation: Designation::Member,
            birth_day: None,
            birth_month: None,
            status: MemberStatus::Active,
            cell_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn name_splits_on_first_space() {
        let m = member("Ada Obi Lovelace");
        assert_eq!(m.first_name(), "Ada");
        assert_eq!(m.last_name(), "Obi Lovelace");
    }

    #[test]
    fn single_word_name_has_empty_last_name() {
        let m = member("Ada");
        assert_eq!(m.first_name(), "Ada");
        assert_eq!(m.last_name(), "");
    }
}
