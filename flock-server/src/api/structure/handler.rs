//! Hierarchy structure handlers
//!
//! Every create/update accepts leader fields alongside the node payload
//! and funnels them through the leadership assignment workflow in the
//! same transaction as the node write.

use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::models::{
    Cell, CellCreate, CellUpdate, Group, GroupCreate, GroupUpdate, HierarchyLevel,
    LeaderDirective, NewLeaderCredentials, Pcf, PcfCreate, PcfUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{cell, church, group, pcf};
use crate::leadership::{self, LeaderChange};
use crate::rbac;
use crate::utils::{AppError, AppResult};

/// Node response, with provisioning credentials attached exactly once
/// when the workflow created a login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse<T> {
    #[serde(flatten)]
    pub node: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_leader_credentials: Option<NewLeaderCredentials>,
}

impl<T> NodeResponse<T> {
    fn new(node: T, change: LeaderChange) -> Self {
        Self {
            node,
            new_leader_credentials: change.credentials,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GroupCreateRequest {
    #[serde(flatten)]
    pub group: GroupCreate,
    #[serde(flatten)]
    pub leader: LeaderDirective,
}

#[derive(Debug, Deserialize)]
pub struct GroupUpdateRequest {
    #[serde(flatten)]
    pub group: GroupUpdate,
    #[serde(flatten)]
    pub leader: LeaderDirective,
}

#[derive(Debug, Deserialize)]
pub struct PcfCreateRequest {
    #[serde(flatten)]
    pub pcf: PcfCreate,
    #[serde(flatten)]
    pub leader: LeaderDirective,
}

#[derive(Debug, Deserialize)]
pub struct PcfUpdateRequest {
    #[serde(flatten)]
    pub pcf: PcfUpdate,
    #[serde(flatten)]
    pub leader: LeaderDirective,
}

#[derive(Debug, Deserialize)]
pub struct CellCreateRequest {
    #[serde(flatten)]
    pub cell: CellCreate,
    #[serde(flatten)]
    pub leader: LeaderDirective,
}

#[derive(Debug, Deserialize)]
pub struct CellUpdateRequest {
    #[serde(flatten)]
    pub cell: CellUpdate,
    #[serde(flatten)]
    pub leader: LeaderDirective,
}

// ========== Groups (admin only, enforced by router layer) ==========

/// POST /api/admin/groups
pub async fn create_group(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<GroupCreateRequest>,
) -> AppResult<(StatusCode, Json<NodeResponse<Group>>)> {
    req.group.validate()?;

    let church = church::get(&state.pool)
        .await?
        .ok_or_else(|| AppError::validation("Church is not set up yet"))?;
    let church_id = req.group.church_id.unwrap_or(church.id);

    let mut tx = state.pool.begin().await?;
    let created = group::create(&mut *tx, &req.group.name, church_id).await?;
    let change = leadership::reassign_leader(
        &mut tx,
        HierarchyLevel::Group,
        created.id,
        None,
        None,
        &req.leader,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(group_id = created.id, by = %user.id, "group created");
    let node = group::find_by_id(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::internal("Group vanished after create"))?;
    Ok((StatusCode::CREATED, Json(NodeResponse::new(node, change))))
}

/// PATCH /api/admin/groups/{id}
pub async fn update_group(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<GroupUpdateRequest>,
) -> AppResult<Json<NodeResponse<Group>>> {
    req.group.validate()?;

    let existing = group::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))?;

    let mut tx = state.pool.begin().await?;
    if let Some(name) = &req.group.name {
        group::update_name(&mut *tx, id, name).await?;
    }
    let change = leadership::reassign_leader(
        &mut tx,
        HierarchyLevel::Group,
        id,
        None,
        existing.leader_id.as_deref(),
        &req.leader,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(group_id = id, by = %user.id, "group updated");
    let node = group::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))?;
    Ok(Json(NodeResponse::new(node, change)))
}

/// DELETE /api/admin/groups/{id}
pub async fn delete_group(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !group::delete(&state.pool, id).await? {
        return Err(AppError::not_found(format!("Group {id} not found")));
    }
    tracing::info!(group_id = id, by = %user.id, "group deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ========== PCFs ==========

/// POST /api/admin/pcfs
pub async fn create_pcf(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<PcfCreateRequest>,
) -> AppResult<(StatusCode, Json<NodeResponse<Pcf>>)> {
    req.pcf.validate()?;
    rbac::ensure_can_create_pcf(&user, req.pcf.group_id)?;

    group::find_by_id(&state.pool, req.pcf.group_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Group {} not found", req.pcf.group_id)))?;

    let mut tx = state.pool.begin().await?;
    let created = pcf::create(&mut *tx, &req.pcf.name, req.pcf.group_id).await?;
    let change = leadership::reassign_leader(
        &mut tx,
        HierarchyLevel::Pcf,
        created.id,
        Some(req.pcf.group_id),
        None,
        &req.leader,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(pcf_id = created.id, by = %user.id, "pcf created");
    let node = pcf::find_by_id(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::internal("PCF vanished after create"))?;
    Ok((StatusCode::CREATED, Json(NodeResponse::new(node, change))))
}

/// PATCH /api/admin/pcfs/{id}
pub async fn update_pcf(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<PcfUpdateRequest>,
) -> AppResult<Json<NodeResponse<Pcf>>> {
    req.pcf.validate()?;

    let existing = pcf::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("PCF {id} not found")))?;
    rbac::ensure_can_manage_pcf(&user, &existing, "edit")?;

    let mut tx = state.pool.begin().await?;
    if let Some(name) = &req.pcf.name {
        pcf::update_name(&mut *tx, id, name).await?;
    }
    let change = leadership::reassign_leader(
        &mut tx,
        HierarchyLevel::Pcf,
        id,
        Some(existing.group_id),
        existing.leader_id.as_deref(),
        &req.leader,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(pcf_id = id, by = %user.id, "pcf updated");
    let node = pcf::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("PCF {id} not found")))?;
    Ok(Json(NodeResponse::new(node, change)))
}

/// DELETE /api/admin/pcfs/{id}
pub async fn delete_pcf(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = pcf::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("PCF {id} not found")))?;
    rbac::ensure_can_manage_pcf(&user, &existing, "delete")?;

    pcf::delete(&state.pool, id).await?;
    tracing::info!(pcf_id = id, by = %user.id, "pcf deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ========== Cells ==========

/// POST /api/admin/cells
pub async fn create_cell(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CellCreateRequest>,
) -> AppResult<(StatusCode, Json<NodeResponse<Cell>>)> {
    req.cell.validate()?;
    rbac::ensure_can_create_cell(&state.pool, &user, req.cell.pcf_id).await?;

    pcf::find_by_id(&state.pool, req.cell.pcf_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("PCF {} not found", req.cell.pcf_id)))?;

    let mut tx = state.pool.begin().await?;
    let created = cell::create(&mut *tx, &req.cell.name, req.cell.pcf_id).await?;
    let change = leadership::reassign_leader(
        &mut tx,
        HierarchyLevel::Cell,
        created.id,
        Some(req.cell.pcf_id),
        None,
        &req.leader,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(cell_id = created.id, by = %user.id, "cell created");
    let node = cell::find_by_id(&state.pool, created.id)
        .await?
        .ok_or_else(|| AppError::internal("Cell vanished after create"))?;
    Ok((StatusCode::CREATED, Json(NodeResponse::new(node, change))))
}

/// PATCH /api/admin/cells/{id}
pub async fn update_cell(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<CellUpdateRequest>,
) -> AppResult<Json<NodeResponse<Cell>>> {
    req.cell.validate()?;

    let existing = cell::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cell {id} not found")))?;
    rbac::ensure_can_manage_cell(&state.pool, &user, &existing, "edit").await?;

    let mut tx = state.pool.begin().await?;
    if let Some(name) = &req.cell.name {
        cell::update_name(&mut *tx, id, name).await?;
    }
    let change = leadership::reassign_leader(
        &mut tx,
        HierarchyLevel::Cell,
        id,
        Some(existing.pcf_id),
        existing.leader_id.as_deref(),
        &req.leader,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(cell_id = id, by = %user.id, "cell updated");
    let node = cell::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cell {id} not found")))?;
    Ok(Json(NodeResponse::new(node, change)))
}

/// DELETE /api/admin/cells/{id}
pub async fn delete_cell(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let existing = cell::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cell {id} not found")))?;
    rbac::ensure_can_manage_cell(&state.pool, &user, &existing, "delete").await?;

    cell::delete(&state.pool, id).await?;
    tracing::info!(cell_id = id, by = %user.id, "cell deleted");
    Ok(StatusCode::NO_CONTENT)
}
