//! Authentication routes
//!
//! `/api/auth/login` is public; the rest rely on the global `require_auth`
//! middleware.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/user", get(handler::current_user))
        .route("/api/user/change-password", post(handler::change_password))
}
