//! Hierarchy structure admin routes
//!
//! Groups are admin-only; PCFs open to group pastors within their group;
//! cells additionally to PCF leaders within their PCF. The router layers
//! reject foreign roles outright, and the handlers apply the finer
//! node-level scope checks.

mod handler;

use axum::{Router, middleware, routing::post};

use shared::models::Role;

use crate::auth::require_roles;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let groups = Router::new()
        .route("/api/admin/groups", post(handler::create_group))
        .route(
            "/api/admin/groups/{id}",
            axum::routing::patch(handler::update_group).delete(handler::delete_group),
        )
        .layer(middleware::from_fn(require_roles(&[Role::Admin])));

    let pcfs = Router::new()
        .route("/api/admin/pcfs", post(handler::create_pcf))
        .route(
            "/api/admin/pcfs/{id}",
            axum::routing::patch(handler::update_pcf).delete(handler::delete_pcf),
        )
        .layer(middleware::from_fn(require_roles(&[
            Role::Admin,
            Role::GroupPastor,
        ])));

    let cells = Router::new()
        .route("/api/admin/cells", post(handler::create_cell))
        .route(
            "/api/admin/cells/{id}",
            axum::routing::patch(handler::update_cell).delete(handler::delete_cell),
        )
        .layer(middleware::from_fn(require_roles(&[
            Role::Admin,
            Role::GroupPastor,
            Role::PcfLeader,
        ])));

    groups.merge(pcfs).merge(cells)
}
