//! Hierarchy handlers

use axum::{Json, extract::State};

use shared::models::HierarchyTree;

use crate::core::ServerState;
use crate::db::repository::{cell, church, group, pcf};
use crate::utils::AppResult;

/// GET /api/hierarchy
///
/// Flattened full tree, unfiltered; clients apply scope themselves. An
/// unseeded deployment gets an empty structure rather than a 404.
pub async fn tree(State(state): State<ServerState>) -> AppResult<Json<HierarchyTree>> {
    let Some(church) = church::get(&state.pool).await? else {
        return Ok(Json(HierarchyTree {
            church: None,
            groups: vec![],
            pcfs: vec![],
            cells: vec![],
        }));
    };

    let groups = group::find_all(&state.pool).await?;
    let pcfs = pcf::find_all(&state.pool).await?;
    let cells = cell::find_all(&state.pool).await?;

    Ok(Json(HierarchyTree {
        church: Some(church),
        groups,
        pcfs,
        cells,
    }))
}
