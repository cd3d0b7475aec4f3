//! Price grid handlers, including Excel import/export.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::excel;
use crate::state::AppState;
use backbar_core::validation::validate_amount_paise;
use backbar_core::{CoreError, PriceEntry};
use backbar_db::repository::price::PriceInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBody {
    pub item_code: String,
    pub item_name: Option<String>,
    pub size_code: String,
    pub size_name: Option<String>,
    pub purchase_price_paise: i64,
    pub mrp_paise: i64,
}

/// GET /api/prices
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<PriceEntry>>, ApiError> {
    Ok(Json(state.db.prices().list().await?))
}

/// POST /api/prices - batch upsert from the grid.
pub async fn save_batch(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(body): Json<Vec<PriceBody>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut inputs = Vec::with_capacity(body.len());
    for row in &body {
        validate_amount_paise("purchasePricePaise", row.purchase_price_paise)
            .map_err(CoreError::from)?;
        validate_amount_paise("mrpPaise", row.mrp_paise).map_err(CoreError::from)?;
        inputs.push(PriceInput {
            item_code: row.item_code.clone(),
            item_name: row.item_name.clone().unwrap_or_default(),
            size_code: row.size_code.clone(),
            size_name: row.size_name.clone().unwrap_or_default(),
            purchase_price_paise: row.purchase_price_paise,
            mrp_paise: row.mrp_paise,
        });
    }

    let saved = state.db.prices().upsert_batch(&inputs).await?;
    Ok(Json(json!({ "success": true, "saved": saved })))
}

/// GET /api/prices/export - xlsx download.
pub async fn export(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state.db.prices().list().await?;
    let bytes = excel::export_prices(&entries)?;
    Ok(xlsx_response("prices.xlsx", bytes))
}

/// POST /api/prices/import - xlsx upload, upsert by item × size.
pub async fn import(
    State(state): State<AppState>,
    _user: AuthUser,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (inputs, errors) = excel::import_prices(&body)?;
    let saved = state.db.prices().upsert_batch(&inputs).await?;

    info!(saved, rejected = errors.len(), "Price sheet imported");

    Ok(Json(json!({
        "success": true,
        "saved": saved,
        "errors": errors,
    })))
}

/// Shared helper: an xlsx attachment response.
pub(crate) fn xlsx_response(file_name: &str, bytes: Vec<u8>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
}
