//! User Repository
//!
//! Login principals. Role and scope pointers are only ever rewritten by
//! the leadership workflow (`promote` / `demote`) or at provisioning.

use super::{RepoError, RepoResult};
use shared::models::{HierarchyLevel, Role, User};
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, email, username, password, first_name, last_name, role, title, group_id, pcf_id, cell_id, member_id, force_password_change, created_at, updated_at FROM users";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let sql = format!("{SELECT} ORDER BY created_at");
    Ok(sqlx::query_as::<_, User>(&sql).fetch_all(db).await?)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: &str) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT} WHERE id = ?");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn find_by_email(db: impl SqliteExecutor<'_>, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT} WHERE email = ?");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await?)
}

pub async fn find_by_member_id(
    db: impl SqliteExecutor<'_>,
    member_id: i64,
) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT} WHERE member_id = ?");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(member_id)
        .fetch_optional(db)
        .await?)
}

/// Lookup by email or username, for login.
pub async fn find_by_identifier(
    db: impl SqliteExecutor<'_>,
    identifier: &str,
) -> RepoResult<Option<User>> {
    let sql = format!("{SELECT} WHERE email = ?1 OR username = ?1");
    Ok(sqlx::query_as::<_, User>(&sql)
        .bind(identifier)
        .fetch_optional(db)
        .await?)
}

pub async fn count(db: impl SqliteExecutor<'_>) -> RepoResult<i64> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    Ok(n)
}

/// Fields needed to insert a user. `password` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub group_id: Option<i64>,
    pub pcf_id: Option<i64>,
    pub cell_id: Option<i64>,
    pub member_id: Option<i64>,
    pub force_password_change: bool,
}

pub async fn create(db: impl SqliteExecutor<'_>, data: NewUser) -> RepoResult<User> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = shared::util::now_millis();

    sqlx::query(
        "INSERT INTO users (id, email, username, password, first_name, last_name, role, title, group_id, pcf_id, cell_id, member_id, force_password_change, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
    )
    .bind(&id)
    .bind(&data.email)
    .bind(&data.username)
    .bind(&data.password)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(data.role)
    .bind(data.group_id)
    .bind(data.pcf_id)
    .bind(data.cell_id)
    .bind(data.member_id)
    .bind(data.force_password_change)
    .bind(now)
    .execute(db)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            RepoError::Duplicate(format!("Email {} is already registered", data.email))
        }
        other => other.into(),
    })?;

    Ok(User {
        id,
        email: data.email,
        username: data.username,
        password: data.password,
        first_name: data.first_name,
        last_name: data.last_name,
        role: data.role,
        title: None,
        group_id: data.group_id,
        pcf_id: data.pcf_id,
        cell_id: data.cell_id,
        member_id: data.member_id,
        force_password_change: data.force_password_change,
        created_at: now,
        updated_at: now,
    })
}

/// Promote a user into a leadership role. Only the scope pointers given
/// as `Some` are overwritten; the rest keep their values.
pub async fn promote(
    db: impl SqliteExecutor<'_>,
    id: &str,
    role: Role,
    group_id: Option<i64>,
    pcf_id: Option<i64>,
    cell_id: Option<i64>,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET role = ?1, group_id = COALESCE(?2, group_id), \
         pcf_id = COALESCE(?3, pcf_id), cell_id = COALESCE(?4, cell_id), updated_at = ?5 \
         WHERE id = ?6",
    )
    .bind(role)
    .bind(group_id)
    .bind(pcf_id)
    .bind(cell_id)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

/// Demote a displaced leader back to `member`, clearing the scope
/// pointers owned by the level they led (group: group_id; pcf: pcf_id and
/// the inherited group_id; cell: cell_id).
pub async fn demote(
    db: impl SqliteExecutor<'_>,
    id: &str,
    level: HierarchyLevel,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let sql = match level {
        HierarchyLevel::Group => {
            "UPDATE users SET role = 'member', group_id = NULL, updated_at = ?1 WHERE id = ?2"
        }
        HierarchyLevel::Pcf => {
            "UPDATE users SET role = 'member', pcf_id = NULL, group_id = NULL, updated_at = ?1 WHERE id = ?2"
        }
        HierarchyLevel::Cell => {
            "UPDATE users SET role = 'member', cell_id = NULL, updated_at = ?1 WHERE id = ?2"
        }
    };
    let rows = sqlx::query(sql).bind(now).bind(id).execute(db).await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

pub async fn set_password(
    db: impl SqliteExecutor<'_>,
    id: &str,
    password_hash: &str,
    force_change: bool,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET password = ?1, force_password_change = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(password_hash)
    .bind(force_change)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}
