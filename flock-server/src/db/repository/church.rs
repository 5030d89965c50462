//! Church Repository
//!
//! One church row per deployment; creation is idempotent-by-absence.

use super::RepoResult;
use shared::models::Church;
use sqlx::SqliteExecutor;

pub async fn get(db: impl SqliteExecutor<'_>) -> RepoResult<Option<Church>> {
    let row = sqlx::query_as::<_, Church>(
        "SELECT id, name, address, created_at FROM churches ORDER BY id LIMIT 1",
    )
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Create the church row if none exists yet. Returns the surviving row
/// either way.
pub async fn ensure(pool: &sqlx::SqlitePool, name: &str, address: Option<&str>) -> RepoResult<Church> {
    if let Some(existing) = get(pool).await? {
        return Ok(existing);
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query("INSERT INTO churches (id, name, address, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(Church {
        id,
        name: name.to_string(),
        address: address.map(str::to_string),
        created_at: now,
    })
}
