//! Database layer
//!
//! SQLite via sqlx. The pool is created once at startup and shared through
//! [`crate::core::ServerState`]; migrations are embedded and run on every
//! connect.

pub mod repository;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Embedded migrations, applied on connect.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Open (creating if missing) the database at `url` and run migrations.
///
/// `url` is a sqlx SQLite URL, e.g. `sqlite:///var/lib/flock/flock.db`.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// In-memory database for tests. A single connection keeps the database
/// alive and visible to every query.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_creates_file_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flock.db");
        let url = format!("sqlite:{}", path.display());

        let pool = connect(&url).await.unwrap();
        assert!(path.exists());

        // Migrations ran: the core tables answer queries.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        // Reconnecting to the same file is fine; migrations are idempotent.
        drop(pool);
        connect(&url).await.unwrap();
    }
}
