//! Leader reference resolution types
//!
//! A leader may be named as an existing user, as a member (who may or may
//! not have a login yet), or not at all. The variant is decided by which
//! request field the caller filled in, never by inspecting the shape of an
//! ID string.

use serde::Deserialize;

/// Requested leader for a hierarchy node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeaderRef {
    /// `leaderId` — an existing user's UUID.
    ExistingUser(String),
    /// `memberId` — a member who should lead; a login is looked up or,
    /// with explicit intent, provisioned.
    MemberCandidate(i64),
    /// Clear the leader.
    #[default]
    None,
}

impl LeaderRef {
    pub fn is_none(&self) -> bool {
        matches!(self, LeaderRef::None)
    }
}

/// Leader fields accepted alongside node create/update payloads.
///
/// `leader_id` wins over `member_id` when both are present, matching the
/// precedence of the admin UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderDirective {
    pub leader_id: Option<String>,
    pub member_id: Option<i64>,
    #[serde(default)]
    pub create_user: bool,
    pub user_email: Option<String>,
    pub user_password: Option<String>,
}

impl LeaderDirective {
    pub fn leader_ref(&self) -> LeaderRef {
        if let Some(id) = &self.leader_id {
            LeaderRef::ExistingUser(id.clone())
        } else if let Some(id) = self.member_id {
            LeaderRef::MemberCandidate(id)
        } else {
            LeaderRef::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_decides_variant_by_field_not_shape() {
        let d = LeaderDirective {
            leader_id: Some("123".into()), // not UUID-shaped on purpose
            ..Default::default()
        };
        assert_eq!(d.leader_ref(), LeaderRef::ExistingUser("123".into()));

        let d = LeaderDirective {
            member_id: Some(42),
            ..Default::default()
        };
        assert_eq!(d.leader_ref(), LeaderRef::MemberCandidate(42));

        assert_eq!(LeaderDirective::default().leader_ref(), LeaderRef::None);
    }

    #[test]
    fn leader_id_wins_over_member_id() {
        let d = LeaderDirective {
            leader_id: Some("u-1".into()),
            member_id: Some(42),
            ..Default::default()
        };
        assert_eq!(d.leader_ref(), LeaderRef::ExistingUser("u-1".into()));
    }
}
