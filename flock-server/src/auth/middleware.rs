//! Authentication middleware
//!
//! Axum middleware for JWT authentication and role gating. The token only
//! identifies the caller; the user row is re-read on every request so role
//! or scope changes take effect immediately.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::{Role, User};

use crate::auth::JwtService;
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::AppError;

/// Authenticated caller, injected into request extensions by
/// [`require_auth`]. Always reflects the current database row.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

/// Authentication middleware.
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>`,
/// then loads the user row and injects [`CurrentUser`].
///
/// Skipped for:
/// - `OPTIONS *` (CORS preflight)
/// - paths outside `/api/`
/// - `/api/auth/login` and `/api/health`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/auth/login" || path == "/api/health";
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            return match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            };
        }
    };

    // The account may have been deleted or reshaped since the token was
    // issued; what the row says now is what counts.
    let user = user_repo::find_by_id(&state.pool, &claims.sub)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| {
            security_log!("WARN", "auth_unknown_user", user_id = claims.sub.clone());
            AppError::invalid_token("Invalid token")
        })?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Role gate middleware factory.
///
/// ```ignore
/// Router::new()
///     .route("/api/admin/groups", post(handler::create_group))
///     .layer(middleware::from_fn(require_roles(&[Role::Admin])));
/// ```
///
/// Returns 403 when the caller's role is not in `roles`.
pub fn require_roles(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !roles.contains(&user.role) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id.clone(),
                    user_role = user.role.as_str(),
                    uri = format!("{:?}", req.uri())
                );
                return Err(AppError::forbidden(format!(
                    "Role {} may not access this resource",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
