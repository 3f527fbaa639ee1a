//! Authentication Handlers

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::verify_password;
use crate::core::ServerState;
use crate::db::repository as repo;
use crate::utils::{AppError, ok};
use shared::ApiResponse;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response with JWT token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}

/// Authenticate an admin and return a bearer token.
///
/// Unknown user and wrong password produce the same error.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let user = repo::admin_user::find_by_username(state.pool(), &req.username)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::invalid("Account has been disabled"));
    }

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(target: "security", username = %user.username, "admin login");

    Ok(ok(LoginResponse {
        token,
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    }))
}
