//! Item catalog handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::validation::{validate_code, validate_name};
use backbar_core::{CoreError, Item};
use backbar_db::repository::item::ItemInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: u32,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub item_code: Option<String>,
    pub item_name: String,
    pub brand_code: Option<String>,
    pub category_code: Option<String>,
    pub quality_code: Option<String>,
    pub status: Option<bool>,
}

impl ItemBody {
    fn to_input(&self, item_code: String) -> ItemInput {
        ItemInput {
            item_code,
            item_name: self.item_name.trim().to_string(),
            brand_code: self.brand_code.clone(),
            category_code: self.category_code.clone(),
            quality_code: self.quality_code.clone(),
            status: self.status.unwrap_or(true),
        }
    }
}

/// GET /api/items?q=&page=&pageSize= - list grid with typeahead search.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<ItemPage>, ApiError> {
    let page_size = query.page_size.unwrap_or(50).clamp(1, 500);
    let items = state.db.items().search(&query.q, query.page, page_size).await?;
    let total = state.db.items().count(&query.q).await?;
    Ok(Json(ItemPage {
        items,
        total,
        page: query.page,
        page_size,
    }))
}

/// GET /api/items/:code
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .db
        .items()
        .get_by_code(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Item not found: {}", code)))
}

/// POST /api/items
pub async fn create(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<ItemBody>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let code = body
        .item_code
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("itemCode is required".to_string()))?
        .trim()
        .to_string();
    validate_code("itemCode", &code).map_err(CoreError::from)?;
    validate_name("itemName", &body.item_name).map_err(CoreError::from)?;

    let item = state.db.items().insert(&body.to_input(code)).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/items/:code
pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
    Json(body): Json<ItemBody>,
) -> Result<Json<Item>, ApiError> {
    validate_name("itemName", &body.item_name).map_err(CoreError::from)?;
    let item = state.db.items().update(&code, &body.to_input(code.clone())).await?;
    Ok(Json(item))
}

/// DELETE /api/items/:code - soft delete.
pub async fn deactivate(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.items().deactivate(&code).await?;
    Ok(Json(json!({ "success": true })))
}
