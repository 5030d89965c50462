//! Role and designation enums
//!
//! `Role` is the access grant carried by a [`super::User`]; `Designation`
//! is a descriptive label on a [`super::Member`]. They look similar but
//! only `Role` is consulted for authorization.

use serde::{Deserialize, Serialize};

/// User role, ordered from widest to narrowest scope.
///
/// Each leadership role is meaningful only together with the matching
/// scope pointer on the user row (see [`Role::expected_scope`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum Role {
    Admin,
    GroupPastor,
    PcfLeader,
    CellLeader,
    Member,
}

/// Which scope pointer a role requires on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeField {
    None,
    GroupId,
    PcfId,
    CellId,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::GroupPastor => "group_pastor",
            Role::PcfLeader => "pcf_leader",
            Role::CellLeader => "cell_leader",
            Role::Member => "member",
        }
    }

    /// Scope pointer this role must carry to be meaningful.
    pub fn expected_scope(&self) -> ScopeField {
        match self {
            Role::Admin | Role::Member => ScopeField::None,
            Role::GroupPastor => ScopeField::GroupId,
            Role::PcfLeader => ScopeField::PcfId,
            Role::CellLeader => ScopeField::CellId,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "group_pastor" => Ok(Role::GroupPastor),
            "pcf_leader" => Ok(Role::PcfLeader),
            "cell_leader" => Ok(Role::CellLeader),
            "member" => Ok(Role::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Leadership label stored on a member record. Not an access grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Designation {
    Member,
    CellLeader,
    PcfLeader,
    GroupPastor,
    PastoralAssistant,
}

impl Designation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Designation::Member => "MEMBER",
            Designation::CellLeader => "CELL_LEADER",
            Designation::PcfLeader => "PCF_LEADER",
            Designation::GroupPastor => "GROUP_PASTOR",
            Designation::PastoralAssistant => "PASTORAL_ASSISTANT",
        }
    }
}

/// Level of the organizational hierarchy below Church.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyLevel {
    Group,
    Pcf,
    Cell,
}

impl HierarchyLevel {
    /// Role a leader of a node at this level must hold.
    pub fn expected_role(&self) -> Role {
        match self {
            HierarchyLevel::Group => Role::GroupPastor,
            HierarchyLevel::Pcf => Role::PcfLeader,
            HierarchyLevel::Cell => Role::CellLeader,
        }
    }

    /// Designation label written onto the leader's member record.
    pub fn designation(&self) -> Designation {
        match self {
            HierarchyLevel::Group => Designation::GroupPastor,
            HierarchyLevel::Pcf => Designation::PcfLeader,
            HierarchyLevel::Cell => Designation::CellLeader,
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            HierarchyLevel::Group => "Group",
            HierarchyLevel::Pcf => "PCF",
            HierarchyLevel::Cell => "Cell",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            Role::Admin,
            Role::GroupPastor,
            Role::PcfLeader,
            Role::CellLeader,
            Role::Member,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("pastor".parse::<Role>().is_err());
    }

    #[test]
    fn leadership_roles_require_a_scope_pointer() {
        assert_eq!(Role::GroupPastor.expected_scope(), ScopeField::GroupId);
        assert_eq!(Role::PcfLeader.expected_scope(), ScopeField::PcfId);
        assert_eq!(Role::CellLeader.expected_scope(), ScopeField::CellId);
        assert_eq!(Role::Admin.expected_scope(), ScopeField::None);
        assert_eq!(Role::Member.expected_scope(), ScopeField::None);
    }

    #[test]
    fn level_maps_to_role_and_designation() {
        assert_eq!(HierarchyLevel::Cell.expected_role(), Role::CellLeader);
        assert_eq!(HierarchyLevel::Pcf.designation(), Designation::PcfLeader);
        assert_eq!(HierarchyLevel::Group.expected_role(), Role::GroupPastor);
    }
}
