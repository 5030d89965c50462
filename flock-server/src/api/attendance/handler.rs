//! Attendance handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{
    Json,
    extract::{Extension, Query, State},
};
use serde::Deserialize;

use shared::models::{AttendanceMark, AttendanceRecord, AttendanceStats, AttendanceWithMember};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{attendance, member, service};
use crate::rbac;
use crate::utils::{AppError, AppResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    pub service_id: Option<i64>,
}

/// POST /api/attendance
///
/// Idempotent: a repeat mark for the same member and service returns the
/// existing record with 200 instead of creating a second row.
pub async fn mark(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AttendanceMark>,
) -> AppResult<(StatusCode, Json<AttendanceRecord>)> {
    rbac::ensure_can_mark_attendance(&user)?;

    member::find_by_id(&state.pool, payload.member_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {} not found", payload.member_id)))?;
    service::find_by_id(&state.pool, payload.service_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Service {} not found", payload.service_id))
        })?;

    let (record, created) = attendance::mark(&state.pool, &payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)))
}

/// GET /api/attendance?serviceId=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ServiceQuery>,
) -> AppResult<Json<Vec<AttendanceWithMember>>> {
    let service_id = query
        .service_id
        .ok_or_else(|| AppError::validation("serviceId is required"))?;

    let records = attendance::find_by_service_with_members(&state.pool, service_id).await?;
    Ok(Json(records))
}

/// GET /api/attendance/stats[?serviceId=]
///
/// One aggregate for the named service, or one per service when the query
/// is omitted.
pub async fn stats(
    State(state): State<ServerState>,
    Query(query): Query<ServiceQuery>,
) -> AppResult<Response> {
    match query.service_id {
        Some(service_id) => {
            let svc = service::find_by_id(&state.pool, service_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Service {service_id} not found")))?;
            let stats = attendance::stats(&state.pool, svc.id, &svc.name).await?;
            Ok(Json(stats).into_response())
        }
        None => {
            let services = service::find_all(&state.pool).await?;
            let mut all: Vec<AttendanceStats> = Vec::with_capacity(services.len());
            for svc in services {
                all.push(attendance::stats(&state.pool, svc.id, &svc.name).await?);
            }
            Ok(Json(all).into_response())
        }
    }
}
