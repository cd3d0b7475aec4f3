//! Auth and user-management handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::validation::validate_code;
use backbar_core::{CoreError, UserRole};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub user_name: String,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: Option<UserRole>,
    pub status: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStoreRequest {
    pub store_code: String,
}

/// Profile shape kept in the SPA's local storage.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_name: String,
    pub role: UserRole,
    pub status: bool,
    pub store_code: Option<String>,
    pub store_type: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_code("userName", &request.user_name).map_err(CoreError::from)?;
    if request.password.len() < 6 {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let hash = hash_password(&request.password)?;
    let role = request.role.unwrap_or_default();
    let user = state.db.users().insert(&request.user_name, &hash, role).await?;

    info!(user_name = %user.user_name, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "userName": user.user_name,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_name(&request.user_name)
        .await?
        .filter(|u| u.status && verify_password(&request.password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    // The SPA routes by the assigned store's type (HO vs retail).
    let store_code = state.db.users().primary_store(&user.user_name).await?;
    let store_type = match &store_code {
        Some(code) => state
            .db
            .stores()
            .get_by_code(code)
            .await?
            .and_then(|s| s.store_type),
        None => None,
    };

    let token = state
        .jwt
        .generate_token(&user.user_name, user.role, store_code.clone())?;

    info!(user_name = %user.user_name, "Login successful");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": UserProfile {
            user_name: user.user_name,
            role: user.role,
            status: user.status,
            store_code,
            store_type,
        },
    })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_name(&request.user_name)
        .await?
        .filter(|u| verify_password(&request.old_password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or old password".to_string()))?;

    if request.new_password.len() < 6 {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let hash = hash_password(&request.new_password)?;
    state.db.users().set_password_hash(&user.user_name, &hash).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password reset successful",
    })))
}

/// GET /api/users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    user.require_admin()?;

    let users = state.db.users().list().await?;
    let mut profiles = Vec::with_capacity(users.len());
    for u in users {
        let store_code = state.db.users().primary_store(&u.user_name).await?;
        profiles.push(UserProfile {
            user_name: u.user_name,
            role: u.role,
            status: u.status,
            store_code,
            store_type: None,
        });
    }
    Ok(Json(profiles))
}

/// PUT /api/users/:user_name (admin)
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_name): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;

    if let Some(role) = request.role {
        state.db.users().set_role(&user_name, role).await?;
    }
    if let Some(status) = request.status {
        state.db.users().set_status(&user_name, status).await?;
    }

    Ok(Json(json!({ "success": true })))
}

/// GET /api/users/:user_name/stores
pub async fn list_user_stores(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let assignments = state.db.users().assignments_for(&user_name).await?;
    Ok(Json(assignments.into_iter().map(|a| a.store_code).collect()))
}

/// POST /api/users/:user_name/stores (admin)
pub async fn assign_store(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_name): Path<String>,
    Json(request): Json<AssignStoreRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;

    if !state.db.stores().exists(&request.store_code).await? {
        return Err(ApiError::NotFound(format!(
            "Store not found: {}",
            request.store_code
        )));
    }
    state.db.users().assign_store(&user_name, &request.store_code).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/users/:user_name/stores/:store_code (admin)
pub async fn unassign_store(
    State(state): State<AppState>,
    user: AuthUser,
    Path((user_name, store_code)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    user.require_admin()?;

    state.db.users().unassign_store(&user_name, &store_code).await?;
    Ok(Json(json!({ "success": true })))
}
