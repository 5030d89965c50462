//! Service handlers

use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use shared::models::{Service, ServiceCreate, ServiceUpdate};

use crate::core::ServerState;
use crate::db::repository::service;
use crate::utils::AppResult;

/// GET /api/services
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Service>>> {
    Ok(Json(service::find_all(&state.pool).await?))
}

/// POST /api/services
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ServiceCreate>,
) -> AppResult<(StatusCode, Json<Service>)> {
    payload.validate()?;
    let created = service::create(&state.pool, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/services/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ServiceUpdate>,
) -> AppResult<Json<Service>> {
    payload.validate()?;
    let updated = service::update(&state.pool, id, payload).await?;
    Ok(Json(updated))
}
