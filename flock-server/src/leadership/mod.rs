//! Leadership assignment workflow
//!
//! Setting or replacing the leader of a Group, PCF or Cell is a
//! read-modify-write across three tables: the displaced leader is demoted,
//! the node's `leader_id` is rewritten, and the new leader is promoted
//! (provisioning a login for them first when asked to). The whole sequence
//! runs inside one transaction so a failure midway leaves no half-demoted
//! leaders behind.

use sqlx::{Sqlite, Transaction};

use shared::models::{
    Designation, HierarchyLevel, LeaderDirective, LeaderRef, NewLeaderCredentials, Role, User,
};

use crate::auth::hash_password;
use crate::db::repository::{cell, group, member, pcf, user as user_repo};
use crate::utils::{AppError, AppResult};

/// Outcome of a reassignment. `credentials` is present exactly once, when
/// a login was provisioned for the new leader.
#[derive(Debug)]
pub struct LeaderChange {
    pub leader_id: Option<String>,
    pub credentials: Option<NewLeaderCredentials>,
}

enum Resolved {
    User(User),
    Provisioned(User, NewLeaderCredentials),
    None,
}

/// Provision a login for a member who has none. First/last name come from
/// splitting the member's full name on the first space; the account starts
/// as `member` role with `force_password_change` set.
pub async fn provision_for_member(
    tx: &mut Transaction<'_, Sqlite>,
    member_id: i64,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<User> {
    let member = member::find_by_id(&mut **tx, member_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {member_id} not found")))?;

    if user_repo::find_by_member_id(&mut **tx, member_id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "This member already has a user account",
        ));
    }
    if user_repo::find_by_email(&mut **tx, email).await?.is_some() {
        return Err(AppError::conflict(format!(
            "Email {email} is already registered"
        )));
    }

    let hashed = hash_password(password)?;
    let user = user_repo::create(
        &mut **tx,
        user_repo::NewUser {
            email: email.to_string(),
            username: None,
            password: hashed,
            first_name: Some(member.first_name().to_string()),
            last_name: Some(member.last_name().to_string()),
            role,
            group_id: None,
            pcf_id: None,
            cell_id: None,
            member_id: Some(member.id),
            force_password_change: true,
        },
    )
    .await?;

    tracing::info!(
        member_id,
        user_id = %user.id,
        email,
        "provisioned login for member"
    );
    Ok(user)
}

/// Only the zonal pastor may hand out the zonal pastor role.
pub fn ensure_can_assign_role(caller: &User, role: Role) -> AppResult<()> {
    if role.is_admin() && !caller.role.is_admin() {
        return Err(AppError::forbidden(
            "Group pastors cannot assign the zonal pastor role",
        ));
    }
    Ok(())
}

async fn resolve(
    tx: &mut Transaction<'_, Sqlite>,
    directive: &LeaderDirective,
) -> AppResult<Resolved> {
    match directive.leader_ref() {
        LeaderRef::ExistingUser(id) => {
            // An unknown user ID clears the leader rather than failing;
            // the admin UI can send stale IDs after concurrent edits.
            Ok(user_repo::find_by_id(&mut **tx, &id)
                .await?
                .map(Resolved::User)
                .unwrap_or(Resolved::None))
        }
        LeaderRef::MemberCandidate(member_id) => {
            if let Some(user) = user_repo::find_by_member_id(&mut **tx, member_id).await? {
                return Ok(Resolved::User(user));
            }
            if !directive.create_user {
                return Ok(Resolved::None);
            }
            let email = directive
                .user_email
                .as_deref()
                .ok_or_else(|| AppError::validation("userEmail is required to create a login"))?;
            let password = directive.user_password.as_deref().ok_or_else(|| {
                AppError::validation("userPassword is required to create a login")
            })?;

            let user =
                provision_for_member(tx, member_id, email, password, Role::Member).await?;
            let credentials = NewLeaderCredentials {
                email: email.to_string(),
                temp_password: password.to_string(),
                must_change_password: true,
            };
            Ok(Resolved::Provisioned(user, credentials))
        }
        LeaderRef::None => Ok(Resolved::None),
    }
}

async fn demote_if_displaced(
    tx: &mut Transaction<'_, Sqlite>,
    level: HierarchyLevel,
    old_leader_id: &str,
) -> AppResult<()> {
    let Some(old) = user_repo::find_by_id(&mut **tx, old_leader_id).await? else {
        return Ok(());
    };

    // A stale leader_id may point at someone whose role already moved on
    // (e.g. promoted to a wider scope); leave such rows alone.
    if old.role != level.expected_role() {
        return Ok(());
    }

    user_repo::demote(&mut **tx, &old.id, level).await?;
    if let Some(member_id) = old.member_id {
        member::set_designation(&mut **tx, member_id, Designation::Member).await?;
    }
    tracing::info!(user_id = %old.id, level = level.noun(), "demoted displaced leader");
    Ok(())
}

async fn persist_node_leader(
    tx: &mut Transaction<'_, Sqlite>,
    level: HierarchyLevel,
    node_id: i64,
    leader_id: Option<&str>,
) -> AppResult<()> {
    match level {
        HierarchyLevel::Group => group::set_leader(&mut **tx, node_id, leader_id).await?,
        HierarchyLevel::Pcf => pcf::set_leader(&mut **tx, node_id, leader_id).await?,
        HierarchyLevel::Cell => cell::set_leader(&mut **tx, node_id, leader_id).await?,
    }
    Ok(())
}

async fn promote(
    tx: &mut Transaction<'_, Sqlite>,
    level: HierarchyLevel,
    node_id: i64,
    parent_id: Option<i64>,
    user: &User,
) -> AppResult<()> {
    let (group_id, pcf_id, cell_id) = match level {
        HierarchyLevel::Group => (Some(node_id), None, None),
        HierarchyLevel::Pcf => (parent_id, Some(node_id), None),
        HierarchyLevel::Cell => (None, parent_id, Some(node_id)),
    };

    user_repo::promote(
        &mut **tx,
        &user.id,
        level.expected_role(),
        group_id,
        pcf_id,
        cell_id,
    )
    .await?;

    if let Some(member_id) = user.member_id {
        member::set_designation(&mut **tx, member_id, level.designation()).await?;
    }
    tracing::info!(user_id = %user.id, level = level.noun(), node_id, "promoted leader");
    Ok(())
}

/// Set or replace the leader of a hierarchy node.
///
/// `parent_id` is the node's parent (the owning group for a PCF, the
/// owning PCF for a cell, nothing for a group); it is written onto the
/// promoted user so their scope chain stays consistent.
///
/// Reassigning the same leader is a no-op: neither demote nor promote
/// runs, so the leader's scope pointers are never cleared and restored.
pub async fn reassign_leader(
    tx: &mut Transaction<'_, Sqlite>,
    level: HierarchyLevel,
    node_id: i64,
    parent_id: Option<i64>,
    current_leader_id: Option<&str>,
    directive: &LeaderDirective,
) -> AppResult<LeaderChange> {
    let (new_leader, credentials) = match resolve(tx, directive).await? {
        Resolved::User(user) => (Some(user), None),
        Resolved::Provisioned(user, credentials) => (Some(user), Some(credentials)),
        Resolved::None => (None, None),
    };

    let new_leader_id = new_leader.as_ref().map(|u| u.id.clone());
    if current_leader_id == new_leader_id.as_deref() {
        return Ok(LeaderChange {
            leader_id: new_leader_id,
            credentials,
        });
    }

    if let Some(old_id) = current_leader_id {
        demote_if_displaced(tx, level, old_id).await?;
    }

    persist_node_leader(tx, level, node_id, new_leader_id.as_deref()).await?;

    if let Some(user) = &new_leader {
        promote(tx, level, node_id, parent_id, user).await?;
    }

    Ok(LeaderChange {
        leader_id: new_leader_id,
        credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, repository};
    use shared::models::MemberCreate;
    use sqlx::SqlitePool;

    async fn seed_chain(pool: &SqlitePool) -> (i64, i64, i64) {
        let church = repository::church::ensure(pool, "Test Church", None)
            .await
            .unwrap();
        let group = repository::group::create(pool, "Group 1", church.id)
            .await
            .unwrap();
        let pcf = repository::pcf::create(pool, "PCF 1", group.id).await.unwrap();
        let cell = repository::cell::create(pool, "Cell 1", pcf.id).await.unwrap();
        (group.id, pcf.id, cell.id)
    }

    async fn seed_user(pool: &SqlitePool, email: &str, role: Role) -> User {
        user_repo::create(
            pool,
            user_repo::NewUser {
                email: email.to_string(),
                username: None,
                password: "hash".to_string(),
                first_name: None,
                last_name: None,
                role,
                group_id: None,
                pcf_id: None,
                cell_id: None,
                member_id: None,
                force_password_change: false,
            },
        )
        .await
        .unwrap()
    }

    async fn seed_member(pool: &SqlitePool, name: &str, cell_id: Option<i64>) -> i64 {
        repository::member::create(
            pool,
            MemberCreate {
                full_name: name.to_string(),
                phone: None,
                email: None,
                gender: None,
                title: None,
                designation: None,
                birth_day: None,
                birth_month: None,
                status: None,
                cell_id,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn run_reassign(
        pool: &SqlitePool,
        level: HierarchyLevel,
        node_id: i64,
        parent_id: Option<i64>,
        current: Option<&str>,
        directive: &LeaderDirective,
    ) -> AppResult<LeaderChange> {
        let mut tx = pool.begin().await.unwrap();
        let change = reassign_leader(&mut tx, level, node_id, parent_id, current, directive).await?;
        tx.commit().await.unwrap();
        Ok(change)
    }

    fn directive_for_user(id: &str) -> LeaderDirective {
        LeaderDirective {
            leader_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_assign_then_replace_demotes_old_leader() {
        let pool = db::memory_pool().await.unwrap();
        let (group_id, _, _) = seed_chain(&pool).await;
        let a = seed_user(&pool, "a@example.org", Role::Member).await;
        let b = seed_user(&pool, "b@example.org", Role::Member).await;

        let change = run_reassign(
            &pool,
            HierarchyLevel::Group,
            group_id,
            None,
            None,
            &directive_for_user(&a.id),
        )
        .await
        .unwrap();
        assert_eq!(change.leader_id.as_deref(), Some(a.id.as_str()));

        let a_row = user_repo::find_by_id(&pool, &a.id).await.unwrap().unwrap();
        assert_eq!(a_row.role, Role::GroupPastor);
        assert_eq!(a_row.group_id, Some(group_id));

        // Replace A with B.
        let change = run_reassign(
            &pool,
            HierarchyLevel::Group,
            group_id,
            None,
            Some(&a.id),
            &directive_for_user(&b.id),
        )
        .await
        .unwrap();
        assert_eq!(change.leader_id.as_deref(), Some(b.id.as_str()));

        let a_row = user_repo::find_by_id(&pool, &a.id).await.unwrap().unwrap();
        assert_eq!(a_row.role, Role::Member);
        assert_eq!(a_row.group_id, None);

        let b_row = user_repo::find_by_id(&pool, &b.id).await.unwrap().unwrap();
        assert_eq!(b_row.role, Role::GroupPastor);
        assert_eq!(b_row.group_id, Some(group_id));

        let group = repository::group::find_by_id(&pool, group_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(group.leader_id.as_deref(), Some(b.id.as_str()));
    }

    #[tokio::test]
    async fn test_same_leader_is_a_noop() {
        let pool = db::memory_pool().await.unwrap();
        let (group_id, pcf_id, _) = seed_chain(&pool).await;
        let leader = seed_user(&pool, "lead@example.org", Role::Member).await;

        run_reassign(
            &pool,
            HierarchyLevel::Pcf,
            pcf_id,
            Some(group_id),
            None,
            &directive_for_user(&leader.id),
        )
        .await
        .unwrap();

        let before = user_repo::find_by_id(&pool, &leader.id).await.unwrap().unwrap();
        assert_eq!(before.role, Role::PcfLeader);

        run_reassign(
            &pool,
            HierarchyLevel::Pcf,
            pcf_id,
            Some(group_id),
            Some(&leader.id),
            &directive_for_user(&leader.id),
        )
        .await
        .unwrap();

        let after = user_repo::find_by_id(&pool, &leader.id).await.unwrap().unwrap();
        assert_eq!(after.role, Role::PcfLeader);
        assert_eq!(after.pcf_id, Some(pcf_id));
        assert_eq!(after.group_id, Some(group_id));
        // No demote ran, so updated_at was not touched by a second cycle.
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_provisions_login_for_member_without_one() {
        let pool = db::memory_pool().await.unwrap();
        let (_, pcf_id, cell_id) = seed_chain(&pool).await;
        let member_id = seed_member(&pool, "Grace Eze", Some(cell_id)).await;

        let directive = LeaderDirective {
            member_id: Some(member_id),
            create_user: true,
            user_email: Some("grace@example.org".to_string()),
            user_password: Some("first-login-pw".to_string()),
            ..Default::default()
        };
        let change = run_reassign(
            &pool,
            HierarchyLevel::Cell,
            cell_id,
            Some(pcf_id),
            None,
            &directive,
        )
        .await
        .unwrap();

        let credentials = change.credentials.expect("credentials returned once");
        assert_eq!(credentials.email, "grace@example.org");
        assert_eq!(credentials.temp_password, "first-login-pw");
        assert!(credentials.must_change_password);

        let user = user_repo::find_by_member_id(&pool, member_id)
            .await
            .unwrap()
            .expect("user provisioned");
        assert_eq!(user.role, Role::CellLeader);
        assert_eq!(user.cell_id, Some(cell_id));
        assert_eq!(user.pcf_id, Some(pcf_id));
        assert_eq!(user.first_name.as_deref(), Some("Grace"));
        assert_eq!(user.last_name.as_deref(), Some("Eze"));
        assert!(user.force_password_change);

        let member = repository::member::find_by_id(&pool, member_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.designation, Designation::CellLeader);
    }

    #[tokio::test]
    async fn test_provisioning_requires_email_and_password() {
        let pool = db::memory_pool().await.unwrap();
        let (_, pcf_id, cell_id) = seed_chain(&pool).await;
        let member_id = seed_member(&pool, "No Login", None).await;

        let directive = LeaderDirective {
            member_id: Some(member_id),
            create_user: true,
            user_email: Some("x@example.org".to_string()),
            ..Default::default()
        };
        let err = run_reassign(
            &pool,
            HierarchyLevel::Cell,
            cell_id,
            Some(pcf_id),
            None,
            &directive,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_provisioning_email_conflict_names_the_email() {
        let pool = db::memory_pool().await.unwrap();
        let (_, pcf_id, cell_id) = seed_chain(&pool).await;
        seed_user(&pool, "taken@example.org", Role::Member).await;
        let member_id = seed_member(&pool, "Second Person", None).await;

        let directive = LeaderDirective {
            member_id: Some(member_id),
            create_user: true,
            user_email: Some("taken@example.org".to_string()),
            user_password: Some("password123".to_string()),
            ..Default::default()
        };
        let err = run_reassign(
            &pool,
            HierarchyLevel::Cell,
            cell_id,
            Some(pcf_id),
            None,
            &directive,
        )
        .await
        .unwrap_err();
        match err {
            AppError::Conflict(msg) => assert!(msg.contains("taken@example.org")),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clearing_leader_demotes_but_skips_mismatched_roles() {
        let pool = db::memory_pool().await.unwrap();
        let (group_id, pcf_id, _) = seed_chain(&pool).await;
        let leader = seed_user(&pool, "lead@example.org", Role::Member).await;

        run_reassign(
            &pool,
            HierarchyLevel::Pcf,
            pcf_id,
            Some(group_id),
            None,
            &directive_for_user(&leader.id),
        )
        .await
        .unwrap();

        // Clearing demotes the pcf_leader back to member.
        run_reassign(
            &pool,
            HierarchyLevel::Pcf,
            pcf_id,
            Some(group_id),
            Some(&leader.id),
            &LeaderDirective::default(),
        )
        .await
        .unwrap();
        let row = user_repo::find_by_id(&pool, &leader.id).await.unwrap().unwrap();
        assert_eq!(row.role, Role::Member);
        assert_eq!(row.pcf_id, None);

        // A stale leader_id pointing at someone whose role moved on is
        // left alone.
        let admin = seed_user(&pool, "admin@example.org", Role::Admin).await;
        repository::pcf::set_leader(&pool, pcf_id, Some(&admin.id))
            .await
            .unwrap();
        run_reassign(
            &pool,
            HierarchyLevel::Pcf,
            pcf_id,
            Some(group_id),
            Some(&admin.id),
            &LeaderDirective::default(),
        )
        .await
        .unwrap();
        let row = user_repo::find_by_id(&pool, &admin.id).await.unwrap().unwrap();
        assert_eq!(row.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_role_escalation_guard() {
        let pool = db::memory_pool().await.unwrap();
        let pastor = seed_user(&pool, "pastor@example.org", Role::GroupPastor).await;
        let admin = seed_user(&pool, "zonal@example.org", Role::Admin).await;

        assert!(ensure_can_assign_role(&pastor, Role::Admin).is_err());
        assert!(ensure_can_assign_role(&pastor, Role::CellLeader).is_ok());
        assert!(ensure_can_assign_role(&admin, Role::Admin).is_ok());
    }
}
