//! Sales entry handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::types::parse_business_date;
use backbar_core::{SaleLine, SaleVoucher, VoucherType};
use backbar_db::repository::sale::{LedgerAllocation, SaleLineInput, SaleSaveRequest};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineBody {
    pub item_code: String,
    pub size_code: String,
    pub mrp_paise: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationBody {
    pub ledger_code: String,
    pub amount_paise: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleBody {
    pub store_code: String,
    /// ISO or DD-MM-YYYY.
    pub invoice_date: String,
    pub party_code: String,
    pub tender_type: Option<String>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleLineBody>,
    #[serde(default)]
    pub other_sales: Vec<AllocationBody>,
    #[serde(default)]
    pub expenses: Vec<AllocationBody>,
    #[serde(default)]
    pub tenders: Vec<AllocationBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleListQuery {
    pub store_code: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberQuery {
    pub store_code: String,
    pub date: Option<String>,
}

/// A voucher with its lines, as the sales register renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithLines {
    #[serde(flatten)]
    pub voucher: SaleVoucher,
    pub items: Vec<SaleLine>,
}

fn allocations(body: &[AllocationBody]) -> Vec<LedgerAllocation> {
    body.iter()
        .map(|a| LedgerAllocation {
            ledger_code: a.ledger_code.clone(),
            amount_paise: a.amount_paise,
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/sales
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<SaleBody>,
) -> Result<(StatusCode, Json<SaleVoucher>), ApiError> {
    let request = SaleSaveRequest {
        store_code: body.store_code.clone(),
        invoice_date: parse_business_date(&body.invoice_date)?,
        party_code: body.party_code.clone(),
        tender_type: body.tender_type.clone(),
        user_name: body.user_name.clone().or(Some(user.user_name)),
        items: body
            .items
            .iter()
            .map(|l| SaleLineInput {
                item_code: l.item_code.clone(),
                size_code: l.size_code.clone(),
                mrp_paise: l.mrp_paise,
                quantity: l.quantity,
            })
            .collect(),
        other_sales: allocations(&body.other_sales),
        expenses: allocations(&body.expenses),
        tenders: allocations(&body.tenders),
    };

    let voucher = state.db.sales().save(&request).await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// GET /api/sales?storeCode=&date= - the day's vouchers with lines.
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SaleListQuery>,
) -> Result<Json<Vec<SaleWithLines>>, ApiError> {
    let date = parse_business_date(&query.date)?;
    let vouchers = state.db.sales().list_by_store_date(&query.store_code, date).await?;

    let mut composed = Vec::with_capacity(vouchers.len());
    for voucher in vouchers {
        let items = state
            .db
            .sales()
            .lines_by_invoice(&voucher.invoice_no, &voucher.store_code)
            .await?;
        composed.push(SaleWithLines { voucher, items });
    }
    Ok(Json(composed))
}

/// GET /api/sales/next-number?storeCode= - provisional invoice number for
/// the entry screen header. Non-binding; the save re-allocates.
pub async fn next_number(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<NextNumberQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = resolve_date(query.date.as_deref())?;
    let number = state
        .db
        .vouchers()
        .preview(VoucherType::Sale, Some(&query.store_code), date)
        .await?;
    Ok(Json(serde_json::json!({ "invoiceNo": number })))
}

/// Preview endpoints accept an optional date; absent means today.
pub(crate) fn resolve_date(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    match raw {
        Some(raw) => Ok(parse_business_date(raw)?),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}
