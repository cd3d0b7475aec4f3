//! Stock position handlers: opening entry, closing queries, typeahead and
//! Excel import/export.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::excel;
use crate::routes::prices::xlsx_response;
use crate::state::AppState;
use backbar_core::types::parse_business_date;
use backbar_core::StockLevel;
use backbar_db::repository::stock::{OpeningStockInput, StockedItem};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingQuery {
    pub store_code: String,
    pub item_code: String,
    pub size_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub store_code: String,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportQuery {
    pub store_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningRow {
    pub store_code: String,
    pub item_code: String,
    pub item_name: Option<String>,
    pub size_code: String,
    pub size_name: Option<String>,
    pub business_date: Option<String>,
    pub opening: i64,
}

/// GET /api/inventory/:store_code
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(store_code): Path<String>,
) -> Result<Json<Vec<StockLevel>>, ApiError> {
    Ok(Json(state.db.stock().list_for_store(&store_code).await?))
}

/// GET /api/inventory/closing?storeCode=&itemCode=[&sizeCode=]
///
/// With a size: a single closing quantity. Without: `{ sizeCode: qty }` for
/// every stocked size (the entry screens' availability hints).
pub async fn closing(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ClosingQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match &query.size_code {
        Some(size_code) => {
            let closing = state
                .db
                .stock()
                .closing_stock(&query.store_code, &query.item_code, size_code)
                .await?;
            Ok(Json(json!({ "closing": closing })))
        }
        None => {
            let rows = state
                .db
                .stock()
                .closing_stock_by_item(&query.store_code, &query.item_code)
                .await?;
            let map: serde_json::Map<String, serde_json::Value> = rows
                .into_iter()
                .map(|(size_code, qty)| (size_code, json!(qty)))
                .collect();
            Ok(Json(serde_json::Value::Object(map)))
        }
    }
}

/// GET /api/inventory/search?storeCode=&q= - typeahead over stocked items.
pub async fn search(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<StockedItem>>, ApiError> {
    Ok(Json(
        state
            .db
            .stock()
            .search_available_items(&query.store_code, &query.q)
            .await?,
    ))
}

/// POST /api/inventory/opening - opening-stock entry screen save.
pub async fn save_opening(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(rows): Json<Vec<OpeningRow>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut inputs = Vec::with_capacity(rows.len());
    for row in &rows {
        let business_date = match &row.business_date {
            Some(raw) => Some(parse_business_date(raw)?),
            None => None,
        };
        inputs.push(OpeningStockInput {
            store_code: row.store_code.clone(),
            item_code: row.item_code.clone(),
            item_name: row.item_name.clone().unwrap_or_default(),
            size_code: row.size_code.clone(),
            size_name: row.size_name.clone().unwrap_or_default(),
            business_date,
            opening: row.opening,
        });
    }

    let saved = state.db.stock().save_opening(&inputs).await?;
    Ok(Json(json!({ "success": true, "saved": saved })))
}

/// GET /api/inventory/:store_code/export - xlsx download.
pub async fn export(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(store_code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let levels = state.db.stock().list_for_store(&store_code).await?;
    let bytes = excel::export_inventory(&levels)?;
    Ok(xlsx_response("opening-inventory.xlsx", bytes))
}

/// POST /api/inventory/import?storeCode= - opening-stock xlsx upload.
pub async fn import(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (inputs, errors) = excel::import_inventory(&body, &query.store_code)?;
    let saved = state.db.stock().save_opening(&inputs).await?;

    info!(saved, rejected = errors.len(), store_code = %query.store_code, "Opening stock imported");

    Ok(Json(json!({
        "success": true,
        "saved": saved,
        "errors": errors,
    })))
}
