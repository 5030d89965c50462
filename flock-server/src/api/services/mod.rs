//! Service schedule routes

mod handler;

use axum::{Router, routing::get, routing::patch};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/services", get(handler::list).post(handler::create))
        .route("/api/services/{id}", patch(handler::update))
}
