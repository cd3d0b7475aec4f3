//! Stock transfer handlers: dispatch (out) and receipt (in).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::sales::resolve_date;
use crate::state::AppState;
use backbar_core::types::parse_business_date;
use backbar_core::{TransferIn, TransferLine, TransferOut, VoucherType};
use backbar_db::repository::transfer::{
    TransferInRequest, TransferLineInput, TransferOutRequest,
};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLineBody {
    pub item_code: String,
    pub item_name: Option<String>,
    pub size_code: String,
    pub size_name: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub price_paise: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutBody {
    /// ISO or DD-MM-YYYY.
    pub date: String,
    pub from_store: String,
    pub to_store: String,
    pub user_name: Option<String>,
    pub narration: Option<String>,
    pub lines: Vec<TransferLineBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInBody {
    /// ISO or DD-MM-YYYY.
    pub date: String,
    pub sto_number: String,
    pub user_name: Option<String>,
    pub narration: Option<String>,
    pub lines: Vec<TransferLineBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingQuery {
    pub to_store: String,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberQuery {
    pub store_code: String,
    pub date: Option<String>,
}

/// An STO with its lines, for the receipt screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutWithLines {
    #[serde(flatten)]
    pub voucher: TransferOut,
    pub lines: Vec<TransferLine>,
}

fn line_inputs(lines: &[TransferLineBody]) -> Vec<TransferLineInput> {
    lines
        .iter()
        .map(|l| TransferLineInput {
            item_code: l.item_code.clone(),
            item_name: l.item_name.clone().unwrap_or_default(),
            size_code: l.size_code.clone(),
            size_name: l.size_name.clone().unwrap_or_default(),
            quantity: l.quantity,
            price_paise: l.price_paise,
        })
        .collect()
}

// =============================================================================
// Transfer out
// =============================================================================

/// POST /api/transfers/out
pub async fn save_out(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<TransferOutBody>,
) -> Result<(StatusCode, Json<TransferOut>), ApiError> {
    let request = TransferOutRequest {
        transfer_date: parse_business_date(&body.date)?,
        from_store: body.from_store.clone(),
        to_store: body.to_store.clone(),
        user_name: body.user_name.clone().or(Some(user.user_name)),
        narration: body.narration.clone(),
        lines: line_inputs(&body.lines),
    };

    let voucher = state.db.transfers().save_out(&request).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// GET /api/transfers/out
pub async fn list_out(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<TransferOut>>, ApiError> {
    Ok(Json(state.db.transfers().list_out().await?))
}

/// GET /api/transfers/out/:sto_number
pub async fn get_out(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(sto_number): Path<String>,
) -> Result<Json<TransferOutWithLines>, ApiError> {
    let (voucher, lines) = state
        .db
        .transfers()
        .get_out(&sto_number)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Transfer not found: {}", sto_number)))?;
    Ok(Json(TransferOutWithLines { voucher, lines }))
}

/// GET /api/transfers/out/next-number?storeCode=
pub async fn next_out_number(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<NextNumberQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = resolve_date(query.date.as_deref())?;
    let number = state
        .db
        .vouchers()
        .preview(VoucherType::StockTransferOut, Some(&query.store_code), date)
        .await?;
    Ok(Json(serde_json::json!({ "stoNumber": number })))
}

// =============================================================================
// Transfer in
// =============================================================================

/// POST /api/transfers/in
pub async fn save_in(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<TransferInBody>,
) -> Result<(StatusCode, Json<TransferIn>), ApiError> {
    let request = TransferInRequest {
        transfer_date: parse_business_date(&body.date)?,
        sto_number: body.sto_number.clone(),
        user_name: body.user_name.clone().or(Some(user.user_name)),
        narration: body.narration.clone(),
        lines: line_inputs(&body.lines),
    };

    let voucher = state.db.transfers().save_in(&request).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// GET /api/transfers/in
pub async fn list_in(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<TransferIn>>, ApiError> {
    Ok(Json(state.db.transfers().list_in().await?))
}

/// GET /api/transfers/pending?toStore=[&date=] - dispatches awaiting receipt.
pub async fn pending(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<TransferOut>>, ApiError> {
    let date = match query.date.as_deref() {
        Some(raw) if !raw.is_empty() => Some(parse_business_date(raw)?),
        _ => None,
    };
    Ok(Json(state.db.transfers().pending_for(&query.to_store, date).await?))
}

/// GET /api/transfers/in/next-number?storeCode=
pub async fn next_in_number(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<NextNumberQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = resolve_date(query.date.as_deref())?;
    let number = state
        .db
        .vouchers()
        .preview(VoucherType::StockTransferIn, Some(&query.store_code), date)
        .await?;
    Ok(Json(serde_json::json!({ "stiNumber": number })))
}
