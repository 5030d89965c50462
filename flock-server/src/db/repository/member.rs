//! Member Repository

use super::{RepoError, RepoResult};
use shared::models::{Designation, Member, MemberCreate, MemberStatus, MemberUpdate};
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, full_name, phone, email, gender, title, designation, birth_day, birth_month, status, cell_id, created_at, updated_at FROM members";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Member>> {
    let sql = format!("{SELECT} ORDER BY created_at DESC");
    Ok(sqlx::query_as::<_, Member>(&sql).fetch_all(db).await?)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Member>> {
    let sql = format!("{SELECT} WHERE id = ?");
    Ok(sqlx::query_as::<_, Member>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn create(pool: &sqlx::SqlitePool, data: MemberCreate) -> RepoResult<Member> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let designation = data.designation.unwrap_or(Designation::Member);
    let status = data.status.unwrap_or(MemberStatus::Active);

    sqlx::query(
        "INSERT INTO members (id, full_name, phone, email, gender, title, designation, birth_day, birth_month, status, cell_id, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(&data.full_name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.gender)
    .bind(&data.title)
    .bind(designation)
    .bind(data.birth_day)
    .bind(data.birth_month)
    .bind(status)
    .bind(data.cell_id)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            RepoError::Duplicate("A member with this email already exists".into())
        }
        other => other.into(),
    })?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create member".into()))
}

pub async fn update(pool: &sqlx::SqlitePool, id: i64, data: MemberUpdate) -> RepoResult<Member> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE members SET full_name = COALESCE(?1, full_name), phone = COALESCE(?2, phone), \
         email = COALESCE(?3, email), gender = COALESCE(?4, gender), title = COALESCE(?5, title), \
         designation = COALESCE(?6, designation), birth_day = COALESCE(?7, birth_day), \
         birth_month = COALESCE(?8, birth_month), status = COALESCE(?9, status), \
         cell_id = COALESCE(?10, cell_id), updated_at = ?11 WHERE id = ?12",
    )
    .bind(&data.full_name)
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.gender)
    .bind(&data.title)
    .bind(data.designation)
    .bind(data.birth_day)
    .bind(data.birth_month)
    .bind(data.status)
    .bind(data.cell_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            RepoError::Duplicate("A member with this email already exists".into())
        }
        other => other.into(),
    })?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Member {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Member {id} not found")))
}

pub async fn set_designation(
    db: impl SqliteExecutor<'_>,
    id: i64,
    designation: Designation,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE members SET designation = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(designation)
        .bind(now)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM members WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}
