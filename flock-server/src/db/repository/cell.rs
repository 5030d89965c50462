//! Cell Repository

use super::{RepoError, RepoResult};
use shared::models::Cell;
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, name, pcf_id, leader_id FROM cells";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Cell>> {
    let sql = format!("{SELECT} ORDER BY name");
    Ok(sqlx::query_as::<_, Cell>(&sql).fetch_all(db).await?)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Cell>> {
    let sql = format!("{SELECT} WHERE id = ?");
    Ok(sqlx::query_as::<_, Cell>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn find_by_pcf(db: impl SqliteExecutor<'_>, pcf_id: i64) -> RepoResult<Vec<Cell>> {
    let sql = format!("{SELECT} WHERE pcf_id = ? ORDER BY name");
    Ok(sqlx::query_as::<_, Cell>(&sql)
        .bind(pcf_id)
        .fetch_all(db)
        .await?)
}

pub async fn create(db: impl SqliteExecutor<'_>, name: &str, pcf_id: i64) -> RepoResult<Cell> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO cells (id, name, pcf_id, leader_id) VALUES (?1, ?2, ?3, NULL)")
        .bind(id)
        .bind(name)
        .bind(pcf_id)
        .execute(db)
        .await?;
    Ok(Cell {
        id,
        name: name.to_string(),
        pcf_id,
        leader_id: None,
    })
}

pub async fn update_name(db: impl SqliteExecutor<'_>, id: i64, name: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE cells SET name = ?1 WHERE id = ?2")
        .bind(name)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cell {id} not found")));
    }
    Ok(())
}

pub async fn set_leader(
    db: impl SqliteExecutor<'_>,
    id: i64,
    leader_id: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE cells SET leader_id = ?1 WHERE id = ?2")
        .bind(leader_id)
        .bind(id)
        .execute(db)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Cell {id} not found")));
    }
    Ok(())
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM cells WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}
