//! # Domain Types
//!
//! Core domain types used throughout Backbar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Masters            Vouchers                 Reconciliation            │
//! │  ─────────          ─────────                ──────────────            │
//! │  Brand              SaleVoucher/SaleLine     StockLevel                │
//! │  Category           PurchaseVoucher/Line     DsrHeader/DsrLine         │
//! │  Size               TransferOut/Line                                   │
//! │  Quality            TransferIn/Line          Numbering                 │
//! │  Item               LedgerEntry              ─────────                 │
//! │  Party                                       VoucherRule               │
//! │  Store              Identity                                           │
//! │  Ledger             ────────                                           │
//! │  PriceEntry         User, StoreAssignment                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code: (item_code, store_code, invoice_no, ...) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Business Dates
// =============================================================================

/// Parses a business date.
///
/// The back-office screens historically posted `DD-MM-YYYY`; newer clients
/// send ISO `YYYY-MM-DD`. Both are accepted; everything is stored as ISO.
///
/// ## Example
/// ```rust
/// use backbar_core::types::parse_business_date;
///
/// let a = parse_business_date("2026-01-04").unwrap();
/// let b = parse_business_date("04-01-2026").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_business_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .map_err(|_| CoreError::InvalidBusinessDate(raw.to_string()))
}

// =============================================================================
// Ledger Kind
// =============================================================================

/// Classification of a ledger account.
///
/// Drives which column of the DSR footer a transaction ledger entry lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerKind {
    /// Primary liquor sale ledgers.
    Sale,
    /// Non-liquor sale heads (soda, snacks, carry bags).
    OtherSale,
    /// Day expenses paid from the till.
    Expense,
    /// Money-in heads (cash, UPI, card) closing the day.
    Tender,
}

// =============================================================================
// DSR Status
// =============================================================================

/// Status of a store's Daily Sale Report for one business date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum DsrStatus {
    /// No header exists yet (virtual status, never stored).
    Pending,
    /// Header created by store-open / transfer population, not yet submitted.
    New,
    /// Store submitted the reconciled report.
    Submitted,
}

impl Default for DsrStatus {
    fn default() -> Self {
        DsrStatus::Pending
    }
}

// =============================================================================
// Transfer Status
// =============================================================================

/// Receipt status of a stock-transfer-out voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferStatus {
    /// Dispatched, not yet received by the destination store.
    Pending,
    /// Destination store booked the matching transfer-in.
    Received,
}

impl Default for TransferStatus {
    fn default() -> Self {
        TransferStatus::Pending
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Role attached to a back-office login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Head-office user: dashboards and reports across stores.
    Ho,
    /// Store user: entry screens for the assigned store.
    Store,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Store
    }
}

// =============================================================================
// Voucher Numbering Enums
// =============================================================================

/// Voucher series a numbering rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    Sale,
    Purchase,
    StockTransferOut,
    StockTransferIn,
}

impl VoucherType {
    /// Stable string form, as used in sequence keys and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::Sale => "SALE",
            VoucherType::Purchase => "PURCHASE",
            VoucherType::StockTransferOut => "STOCK_TRANSFER_OUT",
            VoucherType::StockTransferIn => "STOCK_TRANSFER_IN",
        }
    }
}

/// How often a voucher sequence restarts from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum ResetFrequency {
    Never,
    Daily,
    Monthly,
    Yearly,
}

impl Default for ResetFrequency {
    fn default() -> Self {
        ResetFrequency::Never
    }
}

/// Whether a sequence is shared across stores or kept per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberingScope {
    Global,
    StoreWise,
}

impl Default for NumberingScope {
    fn default() -> Self {
        NumberingScope::Global
    }
}

// =============================================================================
// Master Data
// =============================================================================

/// A liquor brand (e.g. a distillery label).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Brand {
    pub id: String,
    pub code: String,
    pub name: String,
    /// Soft-delete flag.
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item category (Whisky, Beer, Wine, Rum, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub code: String,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pack size (750ml, 375ml, 180ml, ...).
///
/// `sort_order` controls column ordering on the DSR grid; zero means
/// "after all explicitly ordered sizes, alphabetical".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Size {
    pub id: String,
    pub code: String,
    pub name: String,
    pub sort_order: i64,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A quality grade (Premium, Deluxe, Regular, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Quality {
    pub id: String,
    pub code: String,
    pub name: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Item {
    pub id: String,
    /// Business identifier, unique across the catalog.
    pub item_code: String,
    pub item_name: String,
    pub brand_code: Option<String>,
    pub category_code: Option<String>,
    pub quality_code: Option<String>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vendor or customer ledger party.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Party {
    pub id: String,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub pin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pan: Option<String>,
    pub gst_number: Option<String>,
    /// "Vendor" or "Customer"; free-form to match legacy data.
    pub party_type: Option<String>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A retail store (or the head office / warehouse).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Store {
    pub id: String,
    pub store_code: String,
    pub store_name: String,
    pub address: Option<String>,
    pub area: Option<String>,
    pub zone: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub pin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gst_number: Option<String>,
    pub store_type: Option<String>,
    pub status: bool,
    /// True while the trading day is open; gates sales/transfer entry.
    pub open_status: bool,
    /// The business date the store is currently trading under.
    pub business_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ledger account used on entry screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ledger {
    pub id: String,
    pub code: String,
    pub name: String,
    pub kind: LedgerKind,
    /// Which entry screen offers this ledger ("Sale", "Purchase").
    pub screen: Option<String>,
    pub sort_order: i64,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A price-master row: one item in one pack size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PriceEntry {
    pub id: String,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub purchase_price_paise: i64,
    pub mrp_paise: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PriceEntry {
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_paise(self.purchase_price_paise)
    }

    #[inline]
    pub fn mrp(&self) -> Money {
        Money::from_paise(self.mrp_paise)
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Running stock position for one store × item × size.
///
/// Invariant: `closing = opening + purchase + inward - outward`
/// (maintained by [`StockLevel::recompute_closing`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub id: String,
    pub store_code: String,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    /// Date of the last movement applied to this row.
    pub business_date: Option<NaiveDate>,
    pub opening: i64,
    pub purchase: i64,
    pub inward: i64,
    pub outward: i64,
    pub closing: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockLevel {
    /// Recomputes `closing` from the movement columns.
    pub fn recompute_closing(&mut self) {
        self.closing = crate::stock::closing(self.opening, self.purchase, self.inward, self.outward);
    }
}

// =============================================================================
// Identity
// =============================================================================

/// A back-office login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub user_name: String,
    /// Argon2id PHC string; never serialized to the API.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Maps a user to the store they operate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StoreAssignment {
    pub id: String,
    pub user_name: String,
    pub store_code: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Voucher
// =============================================================================

/// Header of a point-of-sale day voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleVoucher {
    pub id: String,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub store_code: String,
    pub party_code: String,
    /// Item-line sale total.
    pub sale_amount_paise: i64,
    /// Non-liquor ledger sale total.
    pub other_sale_paise: i64,
    pub expense_paise: i64,
    pub tender_paise: i64,
    pub tender_type: Option<String>,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SaleVoucher {
    #[inline]
    pub fn sale_amount(&self) -> Money {
        Money::from_paise(self.sale_amount_paise)
    }
}

/// A scanned line on a sale voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub store_code: String,
    pub item_code: String,
    pub size_code: String,
    pub mrp_paise: i64,
    pub quantity: i64,
    pub amount_paise: i64,
    pub created_at: DateTime<Utc>,
}

/// A ledger allocation attached to a sale voucher
/// (other-sale / expense / tender rows of the entry screen).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: String,
    pub voucher_id: String,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub store_code: String,
    pub ledger_code: String,
    pub kind: LedgerKind,
    pub amount_paise: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase Voucher
// =============================================================================

/// Header of a vendor purchase invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseVoucher {
    pub id: String,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub store_code: String,
    pub party_code: String,
    /// Sum of item lines.
    pub purchase_amount_paise: i64,
    /// Full invoice value; must equal purchase + ledger allocations.
    pub total_amount_paise: i64,
    /// Ledger the purchase itself is booked against.
    pub purchase_ledger_code: Option<String>,
    pub narration: Option<String>,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item line on a purchase invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub id: String,
    pub invoice_no: String,
    pub invoice_date: NaiveDate,
    pub store_code: String,
    pub item_code: String,
    pub size_code: String,
    pub price_paise: i64,
    pub quantity: i64,
    pub amount_paise: i64,
    pub created_at: DateTime<Utc>,
}

/// A charge allocation on a purchase invoice (freight, excise, discounts...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLedgerEntry {
    pub id: String,
    pub voucher_id: String,
    pub invoice_no: String,
    pub store_code: String,
    pub ledger_code: String,
    /// Copied from the ledger master at save time; None if unknown code.
    pub kind: Option<LedgerKind>,
    pub amount_paise: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Stock Transfers
// =============================================================================

/// Header of a stock-transfer-out voucher (source store's dispatch).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransferOut {
    pub id: String,
    pub sto_number: String,
    pub transfer_date: NaiveDate,
    pub from_store: String,
    pub to_store: String,
    pub user_name: Option<String>,
    pub narration: Option<String>,
    pub received_status: TransferStatus,
    pub received_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An item line on a transfer-out voucher.
///
/// Item and size names are frozen at dispatch time so the document stays
/// readable even if masters change later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransferLine {
    pub id: String,
    pub sto_number: String,
    pub transfer_date: NaiveDate,
    pub from_store: String,
    pub to_store: String,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub quantity: i64,
    pub price_paise: i64,
    pub amount_paise: i64,
    pub created_at: DateTime<Utc>,
}

/// Header of a stock-transfer-in receipt (destination store's side).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransferIn {
    pub id: String,
    pub sti_number: String,
    pub transfer_date: NaiveDate,
    /// The STO being received.
    pub sto_number: String,
    pub from_store: String,
    pub to_store: String,
    pub user_name: Option<String>,
    pub narration: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An item line on a transfer-in receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransferInLine {
    pub id: String,
    pub sti_number: String,
    pub transfer_date: NaiveDate,
    pub to_store: String,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Daily Sale Report
// =============================================================================

/// Header of a store's Daily Sale Report for one business date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DsrHeader {
    pub id: String,
    pub store_code: String,
    pub dsr_date: NaiveDate,
    pub user_name: Option<String>,
    pub status: DsrStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One item × size row of the Daily Sale Report.
///
/// Invariant: `closing = opening + inward - outward - sale`
/// (maintained by [`DsrLine::recompute_closing`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DsrLine {
    pub id: String,
    pub store_code: String,
    pub dsr_date: NaiveDate,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub purchase_price_paise: i64,
    pub mrp_paise: i64,
    pub opening: i64,
    pub inward: i64,
    pub outward: i64,
    pub sale: i64,
    pub closing: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DsrLine {
    /// Recomputes `closing` from the movement columns.
    pub fn recompute_closing(&mut self) {
        self.closing = crate::dsr::line_closing(self.opening, self.inward, self.outward, self.sale);
    }

    /// Sale value of this row at MRP.
    #[inline]
    pub fn sale_amount(&self) -> Money {
        Money::from_paise(self.mrp_paise).multiply_quantity(self.sale)
    }
}

// =============================================================================
// Voucher Numbering Rule
// =============================================================================

/// Per-series voucher numbering rule.
///
/// See [`crate::voucher::format_voucher_number`] for how the segments are
/// assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VoucherRule {
    pub id: String,
    pub voucher_type: VoucherType,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub include_store_code: bool,
    /// 1 = after prefix, 2 = after year, 3 = before number.
    pub store_code_position: i64,
    pub include_year: bool,
    /// "YYYY" or "YY".
    pub year_format: Option<String>,
    pub include_month: bool,
    /// "MM" or "M".
    pub month_format: Option<String>,
    pub include_day: bool,
    /// "DD" or "D".
    pub day_format: Option<String>,
    pub separator: String,
    pub number_padding: i64,
    pub reset_frequency: ResetFrequency,
    pub numbering_scope: NumberingScope,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_business_date_iso() {
        let d = parse_business_date("2026-08-07").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
    }

    #[test]
    fn test_parse_business_date_legacy() {
        let d = parse_business_date("07-08-2026").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
    }

    #[test]
    fn test_parse_business_date_rejects_garbage() {
        assert!(parse_business_date("4-Jan-26").is_err());
        assert!(parse_business_date("").is_err());
    }

    #[test]
    fn test_dsr_line_closing() {
        let mut line = DsrLine {
            id: String::new(),
            store_code: "S001".into(),
            dsr_date: NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            item_code: "IT001".into(),
            item_name: "Old Oak Whisky".into(),
            size_code: "SZ750".into(),
            size_name: "750ml".into(),
            purchase_price_paise: 40_000,
            mrp_paise: 52_000,
            opening: 24,
            inward: 12,
            outward: 2,
            sale: 9,
            closing: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        line.recompute_closing();
        assert_eq!(line.closing, 25);
        assert_eq!(line.sale_amount().paise(), 468_000);
    }

    #[test]
    fn test_stock_level_closing() {
        let mut level = StockLevel {
            id: String::new(),
            store_code: "S001".into(),
            item_code: "IT001".into(),
            item_name: "Old Oak Whisky".into(),
            size_code: "SZ750".into(),
            size_name: "750ml".into(),
            business_date: None,
            opening: 10,
            purchase: 48,
            inward: 6,
            outward: 20,
            closing: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        level.recompute_closing();
        assert_eq!(level.closing, 44);
    }

    #[test]
    fn test_voucher_type_strings() {
        assert_eq!(VoucherType::StockTransferOut.as_str(), "STOCK_TRANSFER_OUT");
        assert_eq!(VoucherType::Sale.as_str(), "SALE");
    }
}
