//! # Repository Module
//!
//! Database repository implementations, one per aggregate.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                           │
//! │       │   db.sales().save(request)                                      │
//! │       ▼                                                                 │
//! │  SaleRepository                                                         │
//! │  ├── opens a transaction                                                │
//! │  ├── allocates the voucher number (voucher_sequences UPSERT)            │
//! │  ├── writes header + lines + ledger entries                             │
//! │  ├── applies stock movements                                            │
//! │  └── commits - or rolls the whole voucher back                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`master::MasterRepository`] - brands, categories, sizes, qualities
//! - [`item::ItemRepository`] - item catalog
//! - [`party::PartyRepository`] - vendors and customers
//! - [`store::StoreRepository`] - stores and the open/close lifecycle
//! - [`ledger::LedgerRepository`] - ledger accounts
//! - [`price::PriceRepository`] - item × size price grid
//! - [`stock::StockRepository`] - running stock positions
//! - [`user::UserRepository`] - logins and store assignments
//! - [`voucher::VoucherRepository`] - numbering rules and sequences
//! - [`sale::SaleRepository`] - sale vouchers
//! - [`purchase::PurchaseRepository`] - purchase vouchers
//! - [`transfer::TransferRepository`] - stock transfers out/in
//! - [`dsr::DsrRepository`] - Daily Sale Report
//! - [`reports::ReportsRepository`] - cross-store reporting queries

pub mod dsr;
pub mod item;
pub mod ledger;
pub mod master;
pub mod party;
pub mod price;
pub mod purchase;
pub mod reports;
pub mod sale;
pub mod stock;
pub mod store;
pub mod transfer;
pub mod user;
pub mod voucher;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generates a fresh UUID v4 row id.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC timestamp for audit columns.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}
