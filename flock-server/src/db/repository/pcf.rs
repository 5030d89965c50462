//! PCF Repository

use super::{RepoError, RepoResult};
use shared::models::Pcf;
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, name, group_id, leader_id FROM pcfs";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Pcf>> {
    let sql = format!("{SELECT} ORDER BY name");
    Ok(sqlx::query_as::<_, Pcf>(&sql).fetch_all(db).await?)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Pcf>> {
    let sql = format!("{SELECT} WHERE id = ?");
    Ok(sqlx::query_as::<_, Pcf>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn find_by_group(db: impl SqliteExecutor<'_>, group_id: i64) -> RepoResult<Vec<Pcf>> {
    let sql = format!("{SELECT} WHERE group_id = ? ORDER BY name");
    Ok(sqlx::query_as::<_, Pcf>(&sql)
        .bind(group_id)
        .fetch_all(db)
        .await?)
}

pub async fn create(db: impl SqliteExecutor<'_>, name: &str, group_id: i64) -> RepoResult<Pcf> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO pcfs (id, name, group_id, leader_id) VALUES (?1, ?2, ?3, NULL)")
        .bind(id)
        .bind(name)
        .bind(group_id)
        .execute(db)
        .await?;
    Ok(Pcf {
        id,
        name: name.to_string(),
        group_id,
        leader_id: None,
    })
}

pub async fn update_name(db: impl SqliteExecutor<'_>, id: i64, name: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE pcfs SET name = ?1 WHERE id = ?2")
        .bind(name)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("PCF {id} not found")));
    }
    Ok(())
}

pub async fn set_leader(
    db: impl SqliteExecutor<'_>,
    id: i64,
    leader_id: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE pcfs SET leader_id = ?1 WHERE id = ?2")
        .bind(leader_id)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("PCF {id} not found")));
    }
    Ok(())
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM pcfs WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}
