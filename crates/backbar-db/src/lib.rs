//! # backbar-db: Database Layer for Backbar
//!
//! SQLite persistence for the back-office, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Backbar Data Flow                                │
//! │                                                                         │
//! │  axum handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    backbar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ sale, dsr,    │    │  (embedded)  │  │   │
//! │  │   │   SqlitePool  │    │ stock, ...    │    │  *.sql       │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, foreign keys on)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations per aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use backbar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("backbar.db")).await?;
//! let stores = db.stores().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::dsr::DsrRepository;
pub use repository::item::ItemRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::master::MasterRepository;
pub use repository::party::PartyRepository;
pub use repository::price::PriceRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::reports::ReportsRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockRepository;
pub use repository::store::StoreRepository;
pub use repository::transfer::TransferRepository;
pub use repository::user::UserRepository;
pub use repository::voucher::VoucherRepository;
