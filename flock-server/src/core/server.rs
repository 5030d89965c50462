//! Server implementation
//!
//! Router assembly and HTTP server startup.

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::utils::AppResult;

/// HTTP request access log middleware.
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state).
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::hierarchy::router())
        .merge(crate::api::users::router())
        .merge(crate::api::members::router())
        .merge(crate::api::services::router())
        .merge(crate::api::attendance::router())
        .merge(crate::api::structure::router())
}

/// Fully-layered application, ready to serve or to drive in tests via
/// `tower::ServiceExt::oneshot`. `require_auth` sits at router level and
/// skips the public routes itself.
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}

/// HTTP server
pub struct Server {
    state: ServerState,
}

impl Server {
    pub fn with_state(state: ServerState) -> Self {
        Self { state }
    }

    pub async fn run(&self) -> AppResult<()> {
        let app = build_router(self.state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        tracing::info!("Flock server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| crate::utils::AppError::internal(format!("Bind failed: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .map_err(|e| crate::utils::AppError::internal(format!("Server error: {e}")))?;

        Ok(())
    }
}
