//! Group Repository

use super::{RepoError, RepoResult};
use shared::models::Group;
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, name, church_id, leader_id FROM groups";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Group>> {
    let sql = format!("{SELECT} ORDER BY name");
    Ok(sqlx::query_as::<_, Group>(&sql).fetch_all(db).await?)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Group>> {
    let sql = format!("{SELECT} WHERE id = ?");
    Ok(sqlx::query_as::<_, Group>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    name: &str,
    church_id: i64,
) -> RepoResult<Group> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO groups (id, name, church_id, leader_id) VALUES (?1, ?2, ?3, NULL)")
        .bind(id)
        .bind(name)
        .bind(church_id)
        .execute(db)
        .await?;
    Ok(Group {
        id,
        name: name.to_string(),
        church_id,
        leader_id: None,
    })
}

pub async fn update_name(db: impl SqliteExecutor<'_>, id: i64, name: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE groups SET name = ?1 WHERE id = ?2")
        .bind(name)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Group {id} not found")));
    }
    Ok(())
}

pub async fn set_leader(
    db: impl SqliteExecutor<'_>,
    id: i64,
    leader_id: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE groups SET leader_id = ?1 WHERE id = ?2")
        .bind(leader_id)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Group {id} not found")));
    }
    Ok(())
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM groups WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}
