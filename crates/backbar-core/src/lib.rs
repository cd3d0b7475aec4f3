//! # backbar-core: Pure Business Logic for Backbar
//!
//! This crate is the **heart** of the Backbar back-office suite. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Backbar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Back-office SPA (browser)                      │   │
//! │  │    Masters ──► Pricing ──► Sales Entry ──► DSR Screen          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST (JSON)                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /api/sales, /api/dsr, /api/transfers, /api/reports, ...     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ backbar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────┐ ┌─────────┐ ┌───────────┐ │   │
//! │  │   │  types  │ │  money  │ │ stock │ │   dsr   │ │  voucher  │ │   │
//! │  │   └─────────┘ └─────────┘ └───────┘ └─────────┘ └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  backbar-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, Store, Ledger, vouchers, DSR, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`stock`] - Stock-level arithmetic shared by inventory and DSR
//! - [`dsr`] - Daily Sale Report reconciliation
//! - [`voucher`] - Voucher-number formatting and reset keys
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in paise (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dsr;
pub mod error;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Store code used by head-office screens as a shorthand.
///
/// Inventory lookups for `HO` fall back to [`HEAD_OFFICE_STORE`] when no
/// stock row exists under the literal code.
pub const HO_STORE_ALIAS: &str = "HO";

/// Canonical head-office store code.
pub const HEAD_OFFICE_STORE: &str = "Head Office";

/// Maximum item lines allowed on a single voucher (sale, purchase, transfer).
///
/// Prevents runaway payloads from the scan-line entry screens.
pub const MAX_VOUCHER_LINES: usize = 500;

/// Maximum quantity accepted for a single voucher line.
pub const MAX_LINE_QUANTITY: i64 = 99_999;
