//! Hierarchy tree route

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/hierarchy", get(handler::tree))
}
