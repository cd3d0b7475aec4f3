//! Daily Sale Report handlers.
//!
//! The GET composes everything the reconciliation screen needs in one call:
//! the item grid, per-size grand totals, category sale totals, the day's
//! ledger totals and the settlement summary with its variance.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::excel;
use crate::routes::prices::xlsx_response;
use crate::state::AppState;
use backbar_core::dsr::{
    category_totals, size_totals, summarize, DaySummary, LedgerTotals, SizeTotal,
};
use backbar_core::types::parse_business_date;
use backbar_core::{DsrHeader, DsrLine, DsrStatus, Money};
use backbar_db::repository::dsr::{DsrDetailInput, DsrSaveRequest};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsrQuery {
    pub store_code: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsrDetailBody {
    pub item_code: String,
    pub size_code: String,
    pub inward: Option<i64>,
    pub outward: Option<i64>,
    pub sale: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsrSaveBody {
    pub store_code: String,
    /// ISO or DD-MM-YYYY.
    pub dsr_date: String,
    pub user_name: Option<String>,
    #[serde(default)]
    pub details: Vec<DsrDetailBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DsrView {
    pub header: Option<DsrHeader>,
    pub status: DsrStatus,
    pub lines: Vec<DsrLine>,
    pub size_totals: Vec<SizeTotal>,
    pub category_totals: Vec<CategoryTotal>,
    pub other_sales: Vec<LedgerAmount>,
    pub expenses: Vec<LedgerAmount>,
    pub tenders: Vec<LedgerAmount>,
    pub summary: DaySummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_name: String,
    pub amount_paise: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAmount {
    pub ledger_code: String,
    pub amount_paise: i64,
}

fn ledger_amounts(rows: &[(String, Money)]) -> Vec<LedgerAmount> {
    rows.iter()
        .map(|(code, amount)| LedgerAmount {
            ledger_code: code.clone(),
            amount_paise: amount.paise(),
        })
        .collect()
}

// =============================================================================
// Composition
// =============================================================================

struct ComposedDsr {
    header: Option<DsrHeader>,
    status: DsrStatus,
    lines: Vec<DsrLine>,
    size_totals: Vec<SizeTotal>,
    category_totals: Vec<(String, Money)>,
    ledgers: LedgerTotals,
    summary: DaySummary,
}

async fn compose(
    state: &AppState,
    store_code: &str,
    date: NaiveDate,
) -> Result<ComposedDsr, ApiError> {
    let header = state.db.dsr().header(store_code, date).await?;
    let status = header.as_ref().map(|h| h.status).unwrap_or(DsrStatus::Pending);
    let lines = state.db.dsr().lines(store_code, date).await?;

    // item → category-name lookup for the category section
    let items = state.db.items().list_active().await?;
    let categories: HashMap<String, String> = state
        .db
        .masters()
        .list_categories(true)
        .await?
        .into_iter()
        .map(|c| (c.code, c.name))
        .collect();
    let item_category: HashMap<String, String> = items
        .into_iter()
        .filter_map(|item| {
            let category = item.category_code.as_ref().and_then(|c| categories.get(c))?;
            Some((item.item_code, category.clone()))
        })
        .collect();

    // the day's ledger allocations, bucketed by kind
    let entries = state
        .db
        .sales()
        .ledger_entries_by_store_date(store_code, date)
        .await?;
    let ledgers = LedgerTotals::from_entries(
        entries
            .iter()
            .map(|e| (e.ledger_code.as_str(), e.kind, Money::from_paise(e.amount_paise))),
    );

    let size_totals = size_totals(&lines);
    let category_totals = category_totals(&lines, &item_category);
    let summary = summarize(&lines, &ledgers);

    Ok(ComposedDsr {
        header,
        status,
        lines,
        size_totals,
        category_totals,
        ledgers,
        summary,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/dsr?storeCode=&date=
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DsrQuery>,
) -> Result<Json<DsrView>, ApiError> {
    let date = parse_business_date(&query.date)?;
    let composed = compose(&state, &query.store_code, date).await?;

    Ok(Json(DsrView {
        header: composed.header,
        status: composed.status,
        lines: composed.lines,
        size_totals: composed.size_totals,
        category_totals: composed
            .category_totals
            .into_iter()
            .map(|(category_name, amount)| CategoryTotal {
                category_name,
                amount_paise: amount.paise(),
            })
            .collect(),
        other_sales: ledger_amounts(&composed.ledgers.other_sales),
        expenses: ledger_amounts(&composed.ledgers.expenses),
        tenders: ledger_amounts(&composed.ledgers.tenders),
        summary: composed.summary,
    }))
}

/// GET /api/dsr/status?storeCode=&date=
pub async fn status(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DsrQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = parse_business_date(&query.date)?;
    let status = state.db.dsr().status(&query.store_code, date).await?;
    Ok(Json(json!({ "status": status })))
}

/// POST /api/dsr - the screen's submit.
pub async fn save(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<DsrSaveBody>,
) -> Result<Json<DsrHeader>, ApiError> {
    if body.store_code.trim().is_empty() {
        return Err(ApiError::BadRequest("storeCode is required".to_string()));
    }

    let request = DsrSaveRequest {
        store_code: body.store_code.clone(),
        dsr_date: parse_business_date(&body.dsr_date)?,
        user_name: body.user_name.clone().or(Some(user.user_name)),
        details: body
            .details
            .iter()
            .map(|d| DsrDetailInput {
                item_code: d.item_code.clone(),
                size_code: d.size_code.clone(),
                inward: d.inward,
                outward: d.outward,
                sale: d.sale,
            })
            .collect(),
    };

    let header = state.db.dsr().save(&request).await?;
    Ok(Json(header))
}

/// GET /api/dsr/export?storeCode=&date= - xlsx download.
pub async fn export(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DsrQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = parse_business_date(&query.date)?;
    let composed = compose(&state, &query.store_code, date).await?;

    let bytes = excel::export_dsr(
        &query.store_code,
        &date.to_string(),
        &composed.lines,
        &composed.size_totals,
        &composed.category_totals,
        &composed.ledgers.other_sales,
        &composed.ledgers.expenses,
        &composed.ledgers.tenders,
        &composed.summary,
    )?;

    let file_name = format!("dsr-{}-{}.xlsx", query.store_code, date);
    Ok(xlsx_response(&file_name, bytes))
}
