//! HO reporting handlers: collection & expense, closing stock.
//!
//! The repositories return flat aggregation rows; these handlers fold them
//! into the nested per-store shapes the dashboards render.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::types::parse_business_date;
use backbar_core::LedgerKind;

// =============================================================================
// Collection & expense
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionExpenseQuery {
    pub start_date: String,
    pub end_date: String,
    pub zone: Option<String>,
    pub district: Option<String>,
}

/// One store's ledger totals over the range, split by kind.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionExpenseReport {
    pub district: Option<String>,
    pub store_name: String,
    pub sales: BTreeMap<String, i64>,
    pub expenses: BTreeMap<String, i64>,
    pub tenders: BTreeMap<String, i64>,
}

/// GET /api/reports/collection-expense?startDate=&endDate=[&zone=&district=]
pub async fn collection_expense(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CollectionExpenseQuery>,
) -> Result<Json<Vec<CollectionExpenseReport>>, ApiError> {
    let start = parse_business_date(&query.start_date)?;
    let end = parse_business_date(&query.end_date)?;

    let rows = state
        .db
        .reports()
        .collection_expense(start, end, query.zone.as_deref(), query.district.as_deref())
        .await?;

    // fold district|store rows into one report entry per store
    let mut reports: Vec<CollectionExpenseReport> = Vec::new();
    for row in rows {
        let idx = match reports
            .iter()
            .position(|r| r.store_name == row.store_name && r.district == row.district)
        {
            Some(idx) => idx,
            None => {
                reports.push(CollectionExpenseReport {
                    district: row.district.clone(),
                    store_name: row.store_name.clone(),
                    sales: BTreeMap::new(),
                    expenses: BTreeMap::new(),
                    tenders: BTreeMap::new(),
                });
                reports.len() - 1
            }
        };
        let report = &mut reports[idx];

        let bucket = match row.kind {
            LedgerKind::Sale | LedgerKind::OtherSale => &mut report.sales,
            LedgerKind::Expense => &mut report.expenses,
            LedgerKind::Tender => &mut report.tenders,
        };
        *bucket.entry(row.ledger_name).or_insert(0) += row.amount_paise;
    }

    Ok(Json(reports))
}

// =============================================================================
// Closing stock
// =============================================================================

/// One store's closing stock, split by category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingStockReport {
    pub store_code: String,
    pub store_name: String,
    pub district: Option<String>,
    pub category_quantities: BTreeMap<String, i64>,
    pub category_amounts: BTreeMap<String, i64>,
    pub total_quantity: i64,
    pub total_amount_paise: i64,
}

/// GET /api/reports/closing-stock
pub async fn closing_stock(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<ClosingStockReport>>, ApiError> {
    let rows = state.db.reports().closing_stock_by_store().await?;

    let mut reports: Vec<ClosingStockReport> = Vec::new();
    for row in rows {
        let idx = match reports.iter().position(|r| r.store_code == row.store_code) {
            Some(idx) => idx,
            None => {
                reports.push(ClosingStockReport {
                    store_code: row.store_code.clone(),
                    store_name: row.store_name.clone(),
                    district: row.district.clone(),
                    category_quantities: BTreeMap::new(),
                    category_amounts: BTreeMap::new(),
                    total_quantity: 0,
                    total_amount_paise: 0,
                });
                reports.len() - 1
            }
        };
        let report = &mut reports[idx];

        report
            .category_quantities
            .insert(row.category_name.clone(), row.quantity);
        report.category_amounts.insert(row.category_name, row.amount_paise);
        report.total_quantity += row.quantity;
        report.total_amount_paise += row.amount_paise;
    }

    Ok(Json(reports))
}

// =============================================================================
// Closing stock, store-wise detail
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingStockDetail {
    pub store_code: String,
    pub categories: Vec<CategoryGroup>,
    pub grand_total_quantity: i64,
    pub grand_total_amount_paise: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub category_name: String,
    pub total_quantity: i64,
    pub total_amount_paise: i64,
    pub items: Vec<ItemDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub item_code: String,
    pub item_name: String,
    pub size_name: String,
    pub quantity: i64,
    pub mrp_paise: i64,
    pub amount_paise: i64,
}

/// GET /api/reports/closing-stock/:store_code
pub async fn closing_stock_detail(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(store_code): Path<String>,
) -> Result<Json<ClosingStockDetail>, ApiError> {
    let rows = state.db.reports().closing_stock_detail(&store_code).await?;

    let mut categories: Vec<CategoryGroup> = Vec::new();
    let mut grand_total_quantity = 0;
    let mut grand_total_amount_paise = 0;

    // rows arrive ordered by category, so grouping is a linear pass
    for row in rows {
        if categories
            .last()
            .map(|c| c.category_name != row.category_name)
            .unwrap_or(true)
        {
            categories.push(CategoryGroup {
                category_name: row.category_name.clone(),
                total_quantity: 0,
                total_amount_paise: 0,
                items: Vec::new(),
            });
        }

        let idx = categories.len() - 1;
        let group = &mut categories[idx];
        group.total_quantity += row.quantity;
        group.total_amount_paise += row.amount_paise;
        grand_total_quantity += row.quantity;
        grand_total_amount_paise += row.amount_paise;
        group.items.push(ItemDetail {
            item_code: row.item_code,
            item_name: row.item_name,
            size_name: row.size_name,
            quantity: row.quantity,
            mrp_paise: row.mrp_paise,
            amount_paise: row.amount_paise,
        });
    }

    Ok(Json(ClosingStockDetail {
        store_code,
        categories,
        grand_total_quantity,
        grand_total_amount_paise,
    }))
}
