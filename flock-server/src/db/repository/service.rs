//! Service Repository

use super::{RepoError, RepoResult};
use shared::models::{Service, ServiceCreate, ServiceUpdate};
use sqlx::SqliteExecutor;

const SELECT: &str =
    "SELECT id, name, date, start_time, end_time, active, created_at FROM services";

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Service>> {
    let sql = format!("{SELECT} ORDER BY date DESC, start_time DESC");
    Ok(sqlx::query_as::<_, Service>(&sql).fetch_all(db).await?)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Service>> {
    let sql = format!("{SELECT} WHERE id = ?");
    Ok(sqlx::query_as::<_, Service>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?)
}

pub async fn create(db: impl SqliteExecutor<'_>, data: ServiceCreate) -> RepoResult<Service> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let active = data.active.unwrap_or(true);

    sqlx::query(
        "INSERT INTO services (id, name, date, start_time, end_time, active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.date)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(active)
    .bind(now)
    .execute(db)
    .await?;

    Ok(Service {
        id,
        name: data.name,
        date: data.date,
        start_time: data.start_time,
        end_time: data.end_time,
        active,
        created_at: now,
    })
}

pub async fn update(pool: &sqlx::SqlitePool, id: i64, data: ServiceUpdate) -> RepoResult<Service> {
    let rows = sqlx::query(
        "UPDATE services SET name = COALESCE(?1, name), date = COALESCE(?2, date), \
         start_time = COALESCE(?3, start_time), end_time = COALESCE(?4, end_time), \
         active = COALESCE(?5, active) WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.date)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(data.active)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Service {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Service {id} not found")))
}
