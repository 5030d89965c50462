//! Attendance Repository
//!
//! One record per (member, service). `mark` is fetch-or-insert: a repeat
//! mark hands back the existing row untouched, including the racing case
//! where two marks hit the unique index at once.

use std::collections::{BTreeMap, HashMap};

use super::{RepoError, RepoResult};
use shared::models::{
    AttendanceMark, AttendanceRecord, AttendanceStats, AttendanceWithMember, Member,
};
use sqlx::SqliteExecutor;

const SELECT: &str =
    "SELECT id, member_id, service_id, check_in_time, method, location FROM attendance_records";

pub async fn find_pair(
    db: impl SqliteExecutor<'_>,
    member_id: i64,
    service_id: i64,
) -> RepoResult<Option<AttendanceRecord>> {
    let sql = format!("{SELECT} WHERE member_id = ? AND service_id = ?");
    Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(member_id)
        .bind(service_id)
        .fetch_optional(db)
        .await?)
}

/// Idempotent check-in. Returns `(record, created)`.
pub async fn mark(
    pool: &sqlx::SqlitePool,
    data: &AttendanceMark,
) -> RepoResult<(AttendanceRecord, bool)> {
    if let Some(existing) = find_pair(pool, data.member_id, data.service_id).await? {
        return Ok((existing, false));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let insert = sqlx::query(
        "INSERT INTO attendance_records (id, member_id, service_id, check_in_time, method, location) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(id)
    .bind(data.member_id)
    .bind(data.service_id)
    .bind(now)
    .bind(data.method)
    .bind(&data.location)
    .execute(pool)
    .await;

    match insert {
        Ok(_) => Ok((
            AttendanceRecord {
                id,
                member_id: data.member_id,
                service_id: data.service_id,
                check_in_time: now,
                method: data.method,
                location: data.location.clone(),
            },
            true,
        )),
        // Lost the race against a concurrent mark for the same pair.
        Err(sqlx::Error::Database(ref db_err)) if db_err.is_unique_violation() => {
            let existing = find_pair(pool, data.member_id, data.service_id)
                .await?
                .ok_or_else(|| RepoError::Database("Attendance record vanished".into()))?;
            Ok((existing, false))
        }
        Err(other) => Err(other.into()),
    }
}

pub async fn find_by_service(
    db: impl SqliteExecutor<'_>,
    service_id: i64,
) -> RepoResult<Vec<AttendanceRecord>> {
    let sql = format!("{SELECT} WHERE service_id = ? ORDER BY check_in_time");
    Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(service_id)
        .fetch_all(db)
        .await?)
}

/// Records for a service joined with their members. Two queries, zipped
/// in memory; an attendance roster is small enough for that.
pub async fn find_by_service_with_members(
    pool: &sqlx::SqlitePool,
    service_id: i64,
) -> RepoResult<Vec<AttendanceWithMember>> {
    let records = find_by_service(pool, service_id).await?;
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let members: Vec<Member> = sqlx::query_as(
        "SELECT m.id, m.full_name, m.phone, m.email, m.gender, m.title, m.designation, \
         m.birth_day, m.birth_month, m.status, m.cell_id, m.created_at, m.updated_at \
         FROM members m JOIN attendance_records a ON a.member_id = m.id WHERE a.service_id = ?",
    )
    .bind(service_id)
    .fetch_all(pool)
    .await?;

    let mut by_id: HashMap<i64, Member> = members.into_iter().map(|m| (m.id, m)).collect();
    Ok(records
        .into_iter()
        .filter_map(|record| {
            by_id
                .remove(&record.member_id)
                .map(|member| AttendanceWithMember { record, member })
        })
        .collect())
}

/// Aggregate counts for one service. Members without a cell land under
/// the "0" key in `by_cell`.
pub async fn stats(
    pool: &sqlx::SqlitePool,
    service_id: i64,
    service_name: &str,
) -> RepoResult<AttendanceStats> {
    let (total_present,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM attendance_records WHERE service_id = ?")
            .bind(service_id)
            .fetch_one(pool)
            .await?;

    let method_rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT method, COUNT(*) FROM attendance_records WHERE service_id = ? GROUP BY method",
    )
    .bind(service_id)
    .fetch_all(pool)
    .await?;

    let cell_rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT COALESCE(m.cell_id, 0), COUNT(*) FROM attendance_records a \
         JOIN members m ON m.id = a.member_id WHERE a.service_id = ? \
         GROUP BY COALESCE(m.cell_id, 0)",
    )
    .bind(service_id)
    .fetch_all(pool)
    .await?;

    let by_method: BTreeMap<String, i64> = method_rows.into_iter().collect();
    let by_cell: BTreeMap<String, i64> = cell_rows
        .into_iter()
        .map(|(cell_id, n)| (cell_id.to_string(), n))
        .collect();

    Ok(AttendanceStats {
        service_id,
        service_name: service_name.to_string(),
        total_present,
        by_method,
        by_cell,
    })
}
