//! User handlers

use axum::{Json, extract::State};

use shared::models::SafeUser;

use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::utils::AppResult;

/// GET /api/users
///
/// All users without credential material, for leader-selection pickers.
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<SafeUser>>> {
    let users = user_repo::find_all(&state.pool).await?;
    Ok(Json(users.into_iter().map(SafeUser::from).collect()))
}
