//! Purchase entry handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::routes::sales::resolve_date;
use crate::state::AppState;
use backbar_core::types::parse_business_date;
use backbar_core::{PurchaseLedgerEntry, PurchaseLine, PurchaseVoucher, VoucherType};
use backbar_db::repository::purchase::{
    PurchaseAllocation, PurchaseLineInput, PurchaseSaveRequest,
};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineBody {
    pub item_code: String,
    pub size_code: String,
    pub price_paise: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseAllocationBody {
    pub ledger_code: String,
    pub amount_paise: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBody {
    pub invoice_no: Option<String>,
    /// ISO or DD-MM-YYYY.
    pub invoice_date: String,
    pub store_code: String,
    pub party_code: String,
    pub total_amount_paise: i64,
    pub purchase_ledger_code: Option<String>,
    pub narration: Option<String>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub items: Vec<PurchaseLineBody>,
    #[serde(default)]
    pub allocations: Vec<PurchaseAllocationBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberQuery {
    pub store_code: String,
    pub date: Option<String>,
}

/// A purchase voucher with lines and allocations, as the register shows it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseWithDetails {
    #[serde(flatten)]
    pub voucher: PurchaseVoucher,
    pub items: Vec<PurchaseLine>,
    pub ledger_details: Vec<PurchaseLedgerEntry>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/purchases
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PurchaseBody>,
) -> Result<(StatusCode, Json<PurchaseVoucher>), ApiError> {
    let request = PurchaseSaveRequest {
        invoice_no: body.invoice_no.clone(),
        invoice_date: parse_business_date(&body.invoice_date)?,
        store_code: body.store_code.clone(),
        party_code: body.party_code.clone(),
        total_amount_paise: body.total_amount_paise,
        purchase_ledger_code: body.purchase_ledger_code.clone(),
        narration: body.narration.clone(),
        user_name: body.user_name.clone().or(Some(user.user_name)),
        items: body
            .items
            .iter()
            .map(|l| PurchaseLineInput {
                item_code: l.item_code.clone(),
                size_code: l.size_code.clone(),
                price_paise: l.price_paise,
                quantity: l.quantity,
            })
            .collect(),
        allocations: body
            .allocations
            .iter()
            .map(|a| PurchaseAllocation {
                ledger_code: a.ledger_code.clone(),
                amount_paise: a.amount_paise,
            })
            .collect(),
    };

    let voucher = state.db.purchases().save(&request).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// GET /api/purchases - register of all purchase vouchers with details.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<PurchaseWithDetails>>, ApiError> {
    let vouchers = state.db.purchases().list().await?;

    let mut composed = Vec::with_capacity(vouchers.len());
    for voucher in vouchers {
        let items = state
            .db
            .purchases()
            .lines_by_invoice(&voucher.invoice_no, &voucher.store_code)
            .await?;
        let ledger_details = state
            .db
            .purchases()
            .ledger_entries_by_voucher(&voucher.id)
            .await?;
        composed.push(PurchaseWithDetails {
            voucher,
            items,
            ledger_details,
        });
    }
    Ok(Json(composed))
}

/// GET /api/purchases/next-number?storeCode=
pub async fn next_number(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<NextNumberQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = resolve_date(query.date.as_deref())?;
    let number = state
        .db
        .vouchers()
        .preview(VoucherType::Purchase, Some(&query.store_code), date)
        .await?;
    Ok(Json(serde_json::json!({ "invoiceNo": number })))
}
