//! Master catalog handlers: brands, categories, sizes, qualities.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::validation::{validate_code, validate_name};
use backbar_core::{Brand, Category, CoreError, Quality, Size};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeNameBody {
    pub code: Option<String>,
    pub name: String,
    pub status: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeBody {
    pub code: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sort_order: i64,
    pub status: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    pub codes: Vec<String>,
}

fn validated(code: &Option<String>, name: &str, field: &str) -> Result<String, ApiError> {
    let code = code
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))?;
    validate_code(field, code).map_err(CoreError::from)?;
    validate_name("name", name).map_err(CoreError::from)?;
    Ok(code.trim().to_string())
}

// =============================================================================
// Brands
// =============================================================================

pub async fn list_brands(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Brand>>, ApiError> {
    Ok(Json(state.db.masters().list_brands(query.active_only).await?))
}

pub async fn create_brand(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<CodeNameBody>,
) -> Result<(StatusCode, Json<Brand>), ApiError> {
    let code = validated(&body.code, &body.name, "code")?;
    let brand = state.db.masters().insert_brand(&code, body.name.trim()).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

pub async fn update_brand(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<CodeNameBody>,
) -> Result<Json<Brand>, ApiError> {
    validate_name("name", &body.name).map_err(CoreError::from)?;
    let brand = state
        .db
        .masters()
        .update_brand(&code, body.name.trim(), body.status.unwrap_or(true))
        .await?;
    Ok(Json(brand))
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(
        state.db.masters().list_categories(query.active_only).await?,
    ))
}

pub async fn create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<CodeNameBody>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let code = validated(&body.code, &body.name, "code")?;
    let category = state
        .db
        .masters()
        .insert_category(&code, body.name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<CodeNameBody>,
) -> Result<Json<Category>, ApiError> {
    validate_name("name", &body.name).map_err(CoreError::from)?;
    let category = state
        .db
        .masters()
        .update_category(&code, body.name.trim(), body.status.unwrap_or(true))
        .await?;
    Ok(Json(category))
}

// =============================================================================
// Sizes
// =============================================================================

pub async fn list_sizes(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Size>>, ApiError> {
    Ok(Json(state.db.masters().list_sizes(query.active_only).await?))
}

pub async fn create_size(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<SizeBody>,
) -> Result<(StatusCode, Json<Size>), ApiError> {
    let code = validated(&body.code, &body.name, "code")?;
    let size = state
        .db
        .masters()
        .insert_size(&code, body.name.trim(), body.sort_order)
        .await?;
    Ok((StatusCode::CREATED, Json(size)))
}

pub async fn update_size(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<SizeBody>,
) -> Result<Json<Size>, ApiError> {
    validate_name("name", &body.name).map_err(CoreError::from)?;
    let size = state
        .db
        .masters()
        .update_size(&code, body.name.trim(), body.sort_order, body.status.unwrap_or(true))
        .await?;
    Ok(Json(size))
}

/// POST /api/sizes/reorder - the drag-order screen's save.
pub async fn reorder_sizes(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<ReorderBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.masters().reorder_sizes(&body.codes).await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Qualities
// =============================================================================

pub async fn list_qualities(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Quality>>, ApiError> {
    Ok(Json(
        state.db.masters().list_qualities(query.active_only).await?,
    ))
}

pub async fn create_quality(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<CodeNameBody>,
) -> Result<(StatusCode, Json<Quality>), ApiError> {
    let code = validated(&body.code, &body.name, "code")?;
    let quality = state
        .db
        .masters()
        .insert_quality(&code, body.name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(quality)))
}

pub async fn update_quality(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<CodeNameBody>,
) -> Result<Json<Quality>, ApiError> {
    validate_name("name", &body.name).map_err(CoreError::from)?;
    let quality = state
        .db
        .masters()
        .update_quality(&code, body.name.trim(), body.status.unwrap_or(true))
        .await?;
    Ok(Json(quality))
}
