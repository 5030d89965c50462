//! Hierarchy-scoped authorization
//!
//! Visibility and write permission both derive from the caller's role and
//! scope pointers, re-read from the database on every request. Leaders see
//! their own subtree plus the chain of ancestors above it; the admin (the
//! zonal pastor) sees everything.

use sqlx::SqlitePool;

use shared::models::{Cell, Member, Pcf, Role, User};

use crate::utils::{AppError, AppResult};

async fn ids(pool: &SqlitePool, sql: &str, bind: Option<i64>) -> AppResult<Vec<i64>> {
    let mut query = sqlx::query_as::<_, (i64,)>(sql);
    if let Some(v) = bind {
        query = query.bind(v);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Group IDs the user may see. For PCF and cell leaders this is the single
/// ancestor group; an empty vec means nothing is visible.
pub async fn accessible_group_ids(pool: &SqlitePool, user: &User) -> AppResult<Vec<i64>> {
    match user.role {
        Role::Admin => ids(pool, "SELECT id FROM groups", None).await,
        Role::GroupPastor => Ok(user.group_id.into_iter().collect()),
        Role::PcfLeader => match user.pcf_id {
            Some(pcf_id) => {
                ids(
                    pool,
                    "SELECT group_id FROM pcfs WHERE id = ?",
                    Some(pcf_id),
                )
                .await
            }
            None => Ok(vec![]),
        },
        Role::CellLeader => match user.cell_id {
            Some(cell_id) => {
                ids(
                    pool,
                    "SELECT p.group_id FROM pcfs p JOIN cells c ON c.pcf_id = p.id WHERE c.id = ?",
                    Some(cell_id),
                )
                .await
            }
            None => Ok(vec![]),
        },
        Role::Member => Ok(vec![]),
    }
}

pub async fn accessible_pcf_ids(pool: &SqlitePool, user: &User) -> AppResult<Vec<i64>> {
    match user.role {
        Role::Admin => ids(pool, "SELECT id FROM pcfs", None).await,
        Role::GroupPastor => match user.group_id {
            Some(group_id) => {
                ids(pool, "SELECT id FROM pcfs WHERE group_id = ?", Some(group_id)).await
            }
            None => Ok(vec![]),
        },
        Role::PcfLeader => Ok(user.pcf_id.into_iter().collect()),
        Role::CellLeader => match user.cell_id {
            Some(cell_id) => {
                ids(pool, "SELECT pcf_id FROM cells WHERE id = ?", Some(cell_id)).await
            }
            None => Ok(vec![]),
        },
        Role::Member => Ok(vec![]),
    }
}

pub async fn accessible_cell_ids(pool: &SqlitePool, user: &User) -> AppResult<Vec<i64>> {
    match user.role {
        Role::Admin => ids(pool, "SELECT id FROM cells", None).await,
        Role::GroupPastor => match user.group_id {
            Some(group_id) => {
                ids(
                    pool,
                    "SELECT id FROM cells WHERE pcf_id IN (SELECT id FROM pcfs WHERE group_id = ?)",
                    Some(group_id),
                )
                .await
            }
            None => Ok(vec![]),
        },
        Role::PcfLeader => match user.pcf_id {
            Some(pcf_id) => {
                ids(pool, "SELECT id FROM cells WHERE pcf_id = ?", Some(pcf_id)).await
            }
            None => Ok(vec![]),
        },
        Role::CellLeader => Ok(user.cell_id.into_iter().collect()),
        Role::Member => Ok(vec![]),
    }
}

/// Cell filter for member listings. `None` means unfiltered (admin);
/// `Some(vec![])` means no members are visible at all.
pub async fn member_filter(pool: &SqlitePool, user: &User) -> AppResult<Option<Vec<i64>>> {
    if user.role.is_admin() {
        return Ok(None);
    }
    Ok(Some(accessible_cell_ids(pool, user).await?))
}

/// Whether `member` falls inside the caller's visible cells.
pub async fn can_view_member(pool: &SqlitePool, user: &User, member: &Member) -> AppResult<bool> {
    match member_filter(pool, user).await? {
        None => Ok(true),
        Some(cell_ids) => Ok(member
            .cell_id
            .map(|c| cell_ids.contains(&c))
            .unwrap_or(false)),
    }
}

// ========== Write gates ==========
//
// Each gate returns `Forbidden` with the reason a caller would want to
// read, never a silent scope-down.

pub fn ensure_can_create_pcf(user: &User, group_id: i64) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::GroupPastor if user.group_id == Some(group_id) => Ok(()),
        Role::GroupPastor => Err(AppError::forbidden(
            "You can only create PCFs in your own group",
        )),
        _ => Err(AppError::forbidden(
            "You do not have permission to create PCFs",
        )),
    }
}

pub fn ensure_can_manage_pcf(user: &User, pcf: &Pcf, action: &str) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::GroupPastor if user.group_id == Some(pcf.group_id) => Ok(()),
        Role::GroupPastor => Err(AppError::forbidden(format!(
            "You can only {action} PCFs in your own group"
        ))),
        _ => Err(AppError::forbidden(format!(
            "Only the zonal pastor and group pastors can {action} PCFs"
        ))),
    }
}

pub async fn ensure_can_create_cell(
    pool: &SqlitePool,
    user: &User,
    pcf_id: i64,
) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::GroupPastor => {
            let pcf_ids = accessible_pcf_ids(pool, user).await?;
            if pcf_ids.contains(&pcf_id) {
                Ok(())
            } else {
                Err(AppError::forbidden(
                    "You can only create cells in PCFs within your group",
                ))
            }
        }
        Role::PcfLeader if user.pcf_id == Some(pcf_id) => Ok(()),
        Role::PcfLeader => Err(AppError::forbidden(
            "You can only create cells in your own PCF",
        )),
        _ => Err(AppError::forbidden(
            "You do not have permission to create cells",
        )),
    }
}

pub async fn ensure_can_manage_cell(
    pool: &SqlitePool,
    user: &User,
    cell: &Cell,
    action: &str,
) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::GroupPastor => {
            let pcf_ids = accessible_pcf_ids(pool, user).await?;
            if pcf_ids.contains(&cell.pcf_id) {
                Ok(())
            } else {
                Err(AppError::forbidden(format!(
                    "You can only {action} cells in your own group"
                )))
            }
        }
        Role::PcfLeader if user.pcf_id == Some(cell.pcf_id) => Ok(()),
        Role::PcfLeader => Err(AppError::forbidden(format!(
            "You can only {action} cells in your own PCF"
        ))),
        _ => Err(AppError::forbidden(format!(
            "Insufficient permissions to {action} cells"
        ))),
    }
}

/// Member creation is tiered: each role may only add members to cells it
/// can already see, and plain members may not add anyone.
pub async fn ensure_can_create_member(
    pool: &SqlitePool,
    user: &User,
    cell_id: Option<i64>,
) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::GroupPastor | Role::PcfLeader => {
            let cell_ids = accessible_cell_ids(pool, user).await?;
            let allowed = cell_id.map(|c| cell_ids.contains(&c)).unwrap_or(false);
            if allowed {
                Ok(())
            } else if user.role == Role::GroupPastor {
                Err(AppError::forbidden(
                    "You can only add members to cells in your group",
                ))
            } else {
                Err(AppError::forbidden(
                    "You can only add members to cells in your PCF",
                ))
            }
        }
        Role::CellLeader => {
            if cell_id.is_some() && cell_id == user.cell_id {
                Ok(())
            } else {
                Err(AppError::forbidden(
                    "You can only add members to your own cell",
                ))
            }
        }
        Role::Member => Err(AppError::forbidden(
            "You do not have permission to add members",
        )),
    }
}

/// Attendance marking is narrower than visibility: only the zonal pastor
/// and group pastors may record check-ins.
pub fn ensure_can_mark_attendance(user: &User) -> AppResult<()> {
    match user.role {
        Role::Admin | Role::GroupPastor => Ok(()),
        _ => Err(AppError::forbidden(
            "Only the zonal pastor and group pastors can mark attendance",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, repository};
    use shared::models::MemberCreate;

    struct Tree {
        group_a: i64,
        group_b: i64,
        pcf_a1: i64,
        pcf_a2: i64,
        pcf_b1: i64,
        cell_a1x: i64,
        cell_a1y: i64,
        cell_a2x: i64,
        cell_b1x: i64,
    }

    async fn seed_tree(pool: &SqlitePool) -> Tree {
        let church = repository::church::ensure(pool, "Test Church", None)
            .await
            .unwrap();
        let group_a = repository::group::create(pool, "Group A", church.id)
            .await
            .unwrap()
            .id;
        let group_b = repository::group::create(pool, "Group B", church.id)
            .await
            .unwrap()
            .id;
        let pcf_a1 = repository::pcf::create(pool, "PCF A1", group_a)
            .await
            .unwrap()
            .id;
        let pcf_a2 = repository::pcf::create(pool, "PCF A2", group_a)
            .await
            .unwrap()
            .id;
        let pcf_b1 = repository::pcf::create(pool, "PCF B1", group_b)
            .await
            .unwrap()
            .id;
        let cell_a1x = repository::cell::create(pool, "Cell A1X", pcf_a1)
            .await
            .unwrap()
            .id;
        let cell_a1y = repository::cell::create(pool, "Cell A1Y", pcf_a1)
            .await
            .unwrap()
            .id;
        let cell_a2x = repository::cell::create(pool, "Cell A2X", pcf_a2)
            .await
            .unwrap()
            .id;
        let cell_b1x = repository::cell::create(pool, "Cell B1X", pcf_b1)
            .await
            .unwrap()
            .id;
        Tree {
            group_a,
            group_b,
            pcf_a1,
            pcf_a2,
            pcf_b1,
            cell_a1x,
            cell_a1y,
            cell_a2x,
            cell_b1x,
        }
    }

    fn user_with(role: Role, group: Option<i64>, pcf: Option<i64>, cell: Option<i64>) -> User {
        User {
            id: "u".to_string(),
            email: "u@example.org".to_string(),
            username: None,
            password: "hash".to_string(),
            first_name: None,
            last_name: None,
            role,
            title: None,
            group_id: group,
            pcf_id: pcf,
            cell_id: cell,
            member_id: None,
            force_password_change: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn sorted(mut v: Vec<i64>) -> Vec<i64> {
        v.sort_unstable();
        v
    }

    #[tokio::test]
    async fn test_admin_sees_everything() {
        let pool = db::memory_pool().await.unwrap();
        let t = seed_tree(&pool).await;
        let admin = user_with(Role::Admin, None, None, None);

        assert_eq!(
            sorted(accessible_group_ids(&pool, &admin).await.unwrap()),
            sorted(vec![t.group_a, t.group_b])
        );
        assert_eq!(
            accessible_cell_ids(&pool, &admin).await.unwrap().len(),
            4
        );
        assert!(member_filter(&pool, &admin).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_group_pastor_sees_own_subtree() {
        let pool = db::memory_pool().await.unwrap();
        let t = seed_tree(&pool).await;
        let pastor = user_with(Role::GroupPastor, Some(t.group_a), None, None);

        assert_eq!(
            accessible_group_ids(&pool, &pastor).await.unwrap(),
            vec![t.group_a]
        );
        assert_eq!(
            sorted(accessible_pcf_ids(&pool, &pastor).await.unwrap()),
            sorted(vec![t.pcf_a1, t.pcf_a2])
        );
        let cells = sorted(accessible_cell_ids(&pool, &pastor).await.unwrap());
        assert_eq!(cells, sorted(vec![t.cell_a1x, t.cell_a1y, t.cell_a2x]));
        assert!(!cells.contains(&t.cell_b1x));
    }

    #[tokio::test]
    async fn test_pcf_leader_sees_ancestors_and_subtree() {
        let pool = db::memory_pool().await.unwrap();
        let t = seed_tree(&pool).await;
        let leader = user_with(Role::PcfLeader, None, Some(t.pcf_a1), None);

        assert_eq!(
            accessible_group_ids(&pool, &leader).await.unwrap(),
            vec![t.group_a]
        );
        assert_eq!(
            accessible_pcf_ids(&pool, &leader).await.unwrap(),
            vec![t.pcf_a1]
        );
        assert_eq!(
            sorted(accessible_cell_ids(&pool, &leader).await.unwrap()),
            sorted(vec![t.cell_a1x, t.cell_a1y])
        );
    }

    #[tokio::test]
    async fn test_cell_leader_scope() {
        let pool = db::memory_pool().await.unwrap();
        let t = seed_tree(&pool).await;
        let leader = user_with(Role::CellLeader, None, None, Some(t.cell_a2x));

        assert_eq!(
            accessible_group_ids(&pool, &leader).await.unwrap(),
            vec![t.group_a]
        );
        assert_eq!(
            accessible_pcf_ids(&pool, &leader).await.unwrap(),
            vec![t.pcf_a2]
        );
        assert_eq!(
            accessible_cell_ids(&pool, &leader).await.unwrap(),
            vec![t.cell_a2x]
        );
    }

    #[tokio::test]
    async fn test_member_and_scopeless_leader_see_nothing() {
        let pool = db::memory_pool().await.unwrap();
        seed_tree(&pool).await;

        let member = user_with(Role::Member, None, None, None);
        assert!(accessible_cell_ids(&pool, &member).await.unwrap().is_empty());
        assert_eq!(member_filter(&pool, &member).await.unwrap(), Some(vec![]));

        // A leader row missing its scope pointer is inert, not all-seeing.
        let broken = user_with(Role::GroupPastor, None, None, None);
        assert!(accessible_cell_ids(&pool, &broken).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_member_visibility_follows_cell_filter() {
        let pool = db::memory_pool().await.unwrap();
        let t = seed_tree(&pool).await;

        let inside = repository::member::create(
            &pool,
            MemberCreate {
                full_name: "In Scope".to_string(),
                phone: None,
                email: None,
                gender: None,
                title: None,
                designation: None,
                birth_day: None,
                birth_month: None,
                status: None,
                cell_id: Some(t.cell_a1x),
            },
        )
        .await
        .unwrap();
        let outside = repository::member::create(
            &pool,
            MemberCreate {
                full_name: "Out Of Scope".to_string(),
                phone: None,
                email: None,
                gender: None,
                title: None,
                designation: None,
                birth_day: None,
                birth_month: None,
                status: None,
                cell_id: Some(t.cell_b1x),
            },
        )
        .await
        .unwrap();

        let pastor = user_with(Role::GroupPastor, Some(t.group_a), None, None);
        assert!(can_view_member(&pool, &pastor, &inside).await.unwrap());
        assert!(!can_view_member(&pool, &pastor, &outside).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_gates() {
        let pool = db::memory_pool().await.unwrap();
        let t = seed_tree(&pool).await;

        let pastor = user_with(Role::GroupPastor, Some(t.group_a), None, None);
        assert!(ensure_can_create_pcf(&pastor, t.group_a).is_ok());
        assert!(ensure_can_create_pcf(&pastor, t.group_b).is_err());
        assert!(ensure_can_create_cell(&pool, &pastor, t.pcf_a2).await.is_ok());
        assert!(ensure_can_create_cell(&pool, &pastor, t.pcf_b1).await.is_err());

        let pcf_leader = user_with(Role::PcfLeader, None, Some(t.pcf_a1), None);
        assert!(ensure_can_create_cell(&pool, &pcf_leader, t.pcf_a1).await.is_ok());
        assert!(ensure_can_create_cell(&pool, &pcf_leader, t.pcf_a2).await.is_err());
        assert!(ensure_can_create_pcf(&pcf_leader, t.group_a).is_err());

        let cell_leader = user_with(Role::CellLeader, None, None, Some(t.cell_a1x));
        assert!(
            ensure_can_create_member(&pool, &cell_leader, Some(t.cell_a1x))
                .await
                .is_ok()
        );
        assert!(
            ensure_can_create_member(&pool, &cell_leader, Some(t.cell_a1y))
                .await
                .is_err()
        );

        let member = user_with(Role::Member, None, None, None);
        assert!(
            ensure_can_create_member(&pool, &member, Some(t.cell_a1x))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_attendance_gate_is_narrower_than_visibility() {
        let admin = user_with(Role::Admin, None, None, None);
        let pastor = user_with(Role::GroupPastor, Some(1), None, None);
        let pcf_leader = user_with(Role::PcfLeader, None, Some(1), None);
        let cell_leader = user_with(Role::CellLeader, None, None, Some(1));

        assert!(ensure_can_mark_attendance(&admin).is_ok());
        assert!(ensure_can_mark_attendance(&pastor).is_ok());
        assert!(ensure_can_mark_attendance(&pcf_leader).is_err());
        assert!(ensure_can_mark_attendance(&cell_leader).is_err());
    }
}
