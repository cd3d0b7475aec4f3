//! REST routes.
//!
//! ## Surface
//! ```text
//! /health                         liveness + database check
//! /api/auth/*                     login, register, reset-password, users
//! /api/brands|categories|sizes|qualities   master catalogs
//! /api/ledgers/*                  ledger accounts
//! /api/items/*                    item catalog
//! /api/parties/*                  vendors / customers
//! /api/stores/*                   store master + open/close lifecycle
//! /api/prices/*                   price grid + Excel import/export
//! /api/inventory/*                stock positions + opening entry
//! /api/sales/*                    sales entry
//! /api/purchases/*                purchase entry
//! /api/transfers/*                stock transfer out / in
//! /api/dsr/*                      Daily Sale Report
//! /api/reports/*                  collection-expense, closing stock
//! /api/voucher-config/*           numbering rules
//! ```

pub mod auth;
pub mod dsr;
pub mod inventory;
pub mod items;
pub mod ledgers;
pub mod masters;
pub mod parties;
pub mod prices;
pub mod purchases;
pub mod reports;
pub mod sales;
pub mod stores;
pub mod transfers;
pub mod vouchers;

use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// Assembles the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // auth + users
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/users", get(auth::list_users))
        .route("/api/users/:user_name", put(auth::update_user))
        .route(
            "/api/users/:user_name/stores",
            get(auth::list_user_stores).post(auth::assign_store),
        )
        .route(
            "/api/users/:user_name/stores/:store_code",
            delete(auth::unassign_store),
        )
        // master catalogs
        .route("/api/brands", get(masters::list_brands).post(masters::create_brand))
        .route("/api/brands/:code", put(masters::update_brand))
        .route(
            "/api/categories",
            get(masters::list_categories).post(masters::create_category),
        )
        .route("/api/categories/:code", put(masters::update_category))
        .route("/api/sizes", get(masters::list_sizes).post(masters::create_size))
        .route("/api/sizes/reorder", post(masters::reorder_sizes))
        .route("/api/sizes/:code", put(masters::update_size))
        .route(
            "/api/qualities",
            get(masters::list_qualities).post(masters::create_quality),
        )
        .route("/api/qualities/:code", put(masters::update_quality))
        // ledgers
        .route("/api/ledgers", get(ledgers::list).post(ledgers::create))
        .route("/api/ledgers/reorder", post(ledgers::reorder))
        .route("/api/ledgers/screen/:screen", get(ledgers::list_for_screen))
        .route("/api/ledgers/:code", put(ledgers::update))
        // items
        .route("/api/items", get(items::list).post(items::create))
        .route(
            "/api/items/:code",
            get(items::get).put(items::update).delete(items::deactivate),
        )
        // parties
        .route("/api/parties", get(parties::list).post(parties::create))
        .route("/api/parties/:code", put(parties::update))
        // stores
        .route("/api/stores", get(stores::list).post(stores::create))
        .route(
            "/api/stores/:code",
            get(stores::get).put(stores::update).delete(stores::deactivate),
        )
        .route("/api/stores/:code/open", post(stores::open))
        .route("/api/stores/:code/close", post(stores::close))
        // prices
        .route("/api/prices", get(prices::list).post(prices::save_batch))
        .route("/api/prices/export", get(prices::export))
        .route("/api/prices/import", post(prices::import))
        // inventory
        .route("/api/inventory/closing", get(inventory::closing))
        .route("/api/inventory/search", get(inventory::search))
        .route("/api/inventory/opening", post(inventory::save_opening))
        .route("/api/inventory/import", post(inventory::import))
        .route("/api/inventory/:store_code", get(inventory::list))
        .route("/api/inventory/:store_code/export", get(inventory::export))
        // sales
        .route("/api/sales", get(sales::list).post(sales::save))
        .route("/api/sales/next-number", get(sales::next_number))
        // purchases
        .route("/api/purchases", get(purchases::list).post(purchases::save))
        .route("/api/purchases/next-number", get(purchases::next_number))
        // transfers
        .route(
            "/api/transfers/out",
            get(transfers::list_out).post(transfers::save_out),
        )
        .route("/api/transfers/out/next-number", get(transfers::next_out_number))
        .route("/api/transfers/out/:sto_number", get(transfers::get_out))
        .route("/api/transfers/in", get(transfers::list_in).post(transfers::save_in))
        .route("/api/transfers/in/next-number", get(transfers::next_in_number))
        .route("/api/transfers/pending", get(transfers::pending))
        // DSR
        .route("/api/dsr", get(dsr::get).post(dsr::save))
        .route("/api/dsr/status", get(dsr::status))
        .route("/api/dsr/export", get(dsr::export))
        // reports
        .route(
            "/api/reports/collection-expense",
            get(reports::collection_expense),
        )
        .route("/api/reports/closing-stock", get(reports::closing_stock))
        .route(
            "/api/reports/closing-stock/:store_code",
            get(reports::closing_stock_detail),
        )
        // voucher numbering rules
        .route("/api/voucher-config", post(vouchers::save))
        .route("/api/voucher-config/:voucher_type", get(vouchers::get))
        .route(
            "/api/voucher-config/:voucher_type/preview",
            get(vouchers::preview),
        )
        .with_state(state)
}

/// Liveness probe: process up, database answering.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let database = state.db.health_check().await;
    Ok(Json(json!({
        "status": "ok",
        "database": database,
    })))
}
