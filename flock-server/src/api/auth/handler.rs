//! Authentication handlers

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use validator::Validate;

use shared::models::{ChangePasswordRequest, LoginRequest, LoginResponse, SafeUser};

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::{AppError, AppResult};

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /api/auth/login
///
/// Accepts email or username. Failures use one unified message so the
/// endpoint cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    req.validate()?;

    let user = match user_repo::find_by_identifier(&state.pool, &req.identifier).await? {
        Some(user) => user,
        None => {
            security_log!("WARN", "login_failed", identifier = req.identifier.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    if !verify_password(&req.password, &user.password)? {
        security_log!("WARN", "login_failed", identifier = req.identifier.clone());
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
    Ok(Json(LoginResponse {
        token,
        user: SafeUser::from(user),
    }))
}

/// GET /api/auth/user
pub async fn current_user(
    Extension(user): Extension<CurrentUser>,
) -> Json<SafeUser> {
    Json(SafeUser::from(user.0))
}

/// POST /api/user/change-password
///
/// Requires the current password; clears `force_password_change`.
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    req.validate()?;

    if !verify_password(&req.current_password, &user.password)? {
        security_log!("WARN", "password_change_rejected", user_id = user.id.clone());
        return Err(AppError::invalid("Current password is incorrect"));
    }

    let hashed = hash_password(&req.new_password)?;
    user_repo::set_password(&state.pool, &user.id, &hashed, false).await?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}
