//! Member directory routes
//!
//! Listing and detail are scope-filtered per caller; writes go through the
//! tiered creation gates. Conversion (provisioning a login for an existing
//! member) is restricted to the zonal pastor and group pastors.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use shared::models::Role;

use crate::auth::require_roles;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let member_routes = Router::new()
        .route("/api/members", get(handler::list).post(handler::create))
        .route(
            "/api/members/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        );

    let convert_routes = Router::new()
        .route("/api/admin/members/{id}/convert", post(handler::convert))
        .layer(middleware::from_fn(require_roles(&[
            Role::Admin,
            Role::GroupPastor,
        ])));

    member_routes.merge(convert_routes)
}
