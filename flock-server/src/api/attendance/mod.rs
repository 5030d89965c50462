//! Attendance routes
//!
//! Marking is allow-list gated in the handler (zonal pastor and group
//! pastors only); listing and stats are open to any authenticated caller.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/attendance", post(handler::mark).get(handler::list))
        .route("/api/attendance/stats", get(handler::stats))
}
