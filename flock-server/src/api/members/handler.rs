//! Member handlers

use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Extension, Path, State},
};
use validator::Validate;

use shared::models::{ConvertMemberRequest, Member, MemberCreate, MemberUpdate, SafeUser};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{member, user as user_repo};
use crate::leadership;
use crate::rbac;
use crate::utils::{AppError, AppResult};

/// GET /api/members - members within the caller's accessible cells;
/// unfiltered for the zonal pastor.
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Member>>> {
    let all = member::find_all(&state.pool).await?;
    match rbac::member_filter(&state.pool, &user).await? {
        None => Ok(Json(all)),
        Some(cell_ids) => Ok(Json(
            all.into_iter()
                .filter(|m| m.cell_id.map(|c| cell_ids.contains(&c)).unwrap_or(false))
                .collect(),
        )),
    }
}

/// GET /api/members/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Member>> {
    let member = member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;

    if !rbac::can_view_member(&state.pool, &user, &member).await? {
        return Err(AppError::forbidden("Access denied"));
    }

    Ok(Json(member))
}

/// POST /api/members
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MemberCreate>,
) -> AppResult<(StatusCode, Json<Member>)> {
    payload.validate()?;
    rbac::ensure_can_create_member(&state.pool, &user, payload.cell_id).await?;

    let member = member::create(&state.pool, payload).await?;
    tracing::info!(member_id = member.id, by = %user.id, "member created");
    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/members/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberUpdate>,
) -> AppResult<Json<Member>> {
    payload.validate()?;

    let existing = member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;
    if !rbac::can_view_member(&state.pool, &user, &existing).await? {
        return Err(AppError::forbidden("Access denied"));
    }

    let updated = member::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}

/// DELETE /api/members/{id}
///
/// Blocked while a user account is linked; the account binds login state
/// to the member row and must be dealt with first.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))?;
    if !rbac::can_view_member(&state.pool, &user, &existing).await? {
        return Err(AppError::forbidden("Access denied"));
    }

    if user_repo::find_by_member_id(&state.pool, id).await?.is_some() {
        return Err(AppError::conflict(
            "This member has a linked user account and cannot be deleted",
        ));
    }

    member::delete(&state.pool, id).await?;
    tracing::info!(member_id = id, by = %user.id, "member deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/members/{id}/convert
///
/// Provision a login for an existing member. Role gating is on the
/// router; the escalation guard keeps group pastors from minting admins.
pub async fn convert(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<ConvertMemberRequest>,
) -> AppResult<(StatusCode, Json<SafeUser>)> {
    req.validate()?;
    leadership::ensure_can_assign_role(&user, req.role)?;

    let mut tx = state.pool.begin().await?;
    let created =
        leadership::provision_for_member(&mut tx, id, &req.email, &req.password, req.role).await?;
    tx.commit().await?;

    tracing::info!(member_id = id, user_id = %created.id, by = %user.id, "member converted to user");
    Ok((StatusCode::CREATED, Json(SafeUser::from(created))))
}
