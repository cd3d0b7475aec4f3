//! # Sale Repository
//!
//! Point-of-sale day vouchers: header + scanned item lines + ledger
//! allocations, committed as one transaction.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/sales                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. store must exist and be open for business                           │
//! │  2. allocate invoice number (previews are never trusted)                │
//! │  3. insert header with recomputed totals                                │
//! │  4. insert lines; each adds quantity to the store's stock outward       │
//! │  5. insert non-zero ledger allocations tagged by section                │
//! │  6. commit                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line amounts are recomputed server-side as `mrp × quantity`; the client's
//! amounts are display-only.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now, stock, voucher};
use backbar_core::stock::Movement;
use backbar_core::validation::validate_quantity;
use backbar_core::{
    CoreError, LedgerEntry, LedgerKind, SaleLine, SaleVoucher, VoucherType, MAX_VOUCHER_LINES,
};

/// One scanned line of the sales entry grid.
#[derive(Debug, Clone)]
pub struct SaleLineInput {
    pub item_code: String,
    pub size_code: String,
    pub mrp_paise: i64,
    pub quantity: i64,
}

/// One ledger allocation row (other-sale / expense / tender sections).
#[derive(Debug, Clone)]
pub struct LedgerAllocation {
    pub ledger_code: String,
    pub amount_paise: i64,
}

/// Full sales-entry payload.
#[derive(Debug, Clone)]
pub struct SaleSaveRequest {
    pub store_code: String,
    pub invoice_date: NaiveDate,
    pub party_code: String,
    pub tender_type: Option<String>,
    pub user_name: Option<String>,
    pub items: Vec<SaleLineInput>,
    pub other_sales: Vec<LedgerAllocation>,
    pub expenses: Vec<LedgerAllocation>,
    pub tenders: Vec<LedgerAllocation>,
}

/// Repository for sale vouchers.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Saves a complete sales-entry payload. Returns the committed header.
    pub async fn save(&self, request: &SaleSaveRequest) -> DbResult<SaleVoucher> {
        if request.items.len() > MAX_VOUCHER_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_VOUCHER_LINES,
            }
            .into());
        }
        for line in &request.items {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        // Entry screens are gated on the trading day being open.
        let store = sqlx::query_as::<_, backbar_core::Store>(
            "SELECT * FROM stores WHERE store_code = ?1",
        )
        .bind(&request.store_code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Store", &request.store_code))?;

        if !store.open_status {
            return Err(CoreError::StoreClosed {
                store_code: request.store_code.clone(),
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let invoice_no = voucher::allocate_number(
            &mut tx,
            VoucherType::Sale,
            Some(&request.store_code),
            request.invoice_date,
        )
        .await?;

        let sale_amount: i64 = request
            .items
            .iter()
            .map(|l| l.mrp_paise * l.quantity)
            .sum();
        let other_sale: i64 = request.other_sales.iter().map(|a| a.amount_paise).sum();
        let expense: i64 = request.expenses.iter().map(|a| a.amount_paise).sum();
        let tender: i64 = request.tenders.iter().map(|a| a.amount_paise).sum();

        let voucher_id = new_id();
        let ts = now();

        debug!(invoice_no = %invoice_no, store_code = %request.store_code, "Inserting sale voucher");

        sqlx::query(
            "INSERT INTO sale_vouchers
                 (id, invoice_no, invoice_date, store_code, party_code,
                  sale_amount_paise, other_sale_paise, expense_paise, tender_paise,
                  tender_type, user_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&voucher_id)
        .bind(&invoice_no)
        .bind(request.invoice_date)
        .bind(&request.store_code)
        .bind(&request.party_code)
        .bind(sale_amount)
        .bind(other_sale)
        .bind(expense)
        .bind(tender)
        .bind(&request.tender_type)
        .bind(&request.user_name)
        .bind(ts)
        .bind(ts)
        .execute(&mut *tx)
        .await?;

        for line in &request.items {
            let amount = line.mrp_paise * line.quantity;
            sqlx::query(
                "INSERT INTO sale_lines
                     (id, invoice_no, invoice_date, store_code, item_code, size_code,
                      mrp_paise, quantity, amount_paise, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(new_id())
            .bind(&invoice_no)
            .bind(request.invoice_date)
            .bind(&request.store_code)
            .bind(&line.item_code)
            .bind(&line.size_code)
            .bind(line.mrp_paise)
            .bind(line.quantity)
            .bind(amount)
            .bind(ts)
            .execute(&mut *tx)
            .await?;

            // Counter sale leaves the store as stock outward.
            stock::apply_movement(
                &mut tx,
                &request.store_code,
                &line.item_code,
                "",
                &line.size_code,
                "",
                request.invoice_date,
                Movement::Outward(line.quantity),
            )
            .await?;
        }

        insert_allocations(
            &mut tx,
            &voucher_id,
            &invoice_no,
            request,
            &request.other_sales,
            LedgerKind::OtherSale,
        )
        .await?;
        insert_allocations(
            &mut tx,
            &voucher_id,
            &invoice_no,
            request,
            &request.expenses,
            LedgerKind::Expense,
        )
        .await?;
        insert_allocations(
            &mut tx,
            &voucher_id,
            &invoice_no,
            request,
            &request.tenders,
            LedgerKind::Tender,
        )
        .await?;

        tx.commit().await?;

        info!(invoice_no = %invoice_no, sale_amount_paise = sale_amount, "Sale voucher saved");

        self.get_by_invoice(&invoice_no, &request.store_code)
            .await?
            .ok_or_else(|| DbError::not_found("SaleVoucher", &invoice_no))
    }

    pub async fn get_by_invoice(
        &self,
        invoice_no: &str,
        store_code: &str,
    ) -> DbResult<Option<SaleVoucher>> {
        Ok(sqlx::query_as::<_, SaleVoucher>(
            "SELECT * FROM sale_vouchers WHERE invoice_no = ?1 AND store_code = ?2",
        )
        .bind(invoice_no)
        .bind(store_code)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(&self) -> DbResult<Vec<SaleVoucher>> {
        Ok(sqlx::query_as::<_, SaleVoucher>(
            "SELECT * FROM sale_vouchers ORDER BY invoice_date DESC, invoice_no DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_by_store_date(
        &self,
        store_code: &str,
        date: NaiveDate,
    ) -> DbResult<Vec<SaleVoucher>> {
        Ok(sqlx::query_as::<_, SaleVoucher>(
            "SELECT * FROM sale_vouchers WHERE store_code = ?1 AND invoice_date = ?2
             ORDER BY invoice_no",
        )
        .bind(store_code)
        .bind(date)
        .fetch_all(&self.pool)
        .await?)
    }

    /// All lines sold by a store on one date (feeds the DSR export).
    pub async fn lines_by_store_date(
        &self,
        store_code: &str,
        date: NaiveDate,
    ) -> DbResult<Vec<SaleLine>> {
        Ok(sqlx::query_as::<_, SaleLine>(
            "SELECT * FROM sale_lines WHERE store_code = ?1 AND invoice_date = ?2",
        )
        .bind(store_code)
        .bind(date)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn lines_by_invoice(&self, invoice_no: &str, store_code: &str) -> DbResult<Vec<SaleLine>> {
        Ok(sqlx::query_as::<_, SaleLine>(
            "SELECT * FROM sale_lines WHERE invoice_no = ?1 AND store_code = ?2",
        )
        .bind(invoice_no)
        .bind(store_code)
        .fetch_all(&self.pool)
        .await?)
    }

    /// All ledger allocations booked by a store on one date.
    pub async fn ledger_entries_by_store_date(
        &self,
        store_code: &str,
        date: NaiveDate,
    ) -> DbResult<Vec<LedgerEntry>> {
        Ok(sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM ledger_entries WHERE store_code = ?1 AND invoice_date = ?2",
        )
        .bind(store_code)
        .bind(date)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Inserts one section's allocations; zero-amount rows are dropped, matching
/// how the entry grid sends every configured ledger whether used or not.
async fn insert_allocations(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    voucher_id: &str,
    invoice_no: &str,
    request: &SaleSaveRequest,
    allocations: &[LedgerAllocation],
    kind: LedgerKind,
) -> DbResult<()> {
    for allocation in allocations {
        if allocation.amount_paise == 0 {
            continue;
        }
        sqlx::query(
            "INSERT INTO ledger_entries
                 (id, voucher_id, invoice_no, invoice_date, store_code, ledger_code,
                  kind, amount_paise, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(new_id())
        .bind(voucher_id)
        .bind(invoice_no)
        .bind(request.invoice_date)
        .bind(&request.store_code)
        .bind(&allocation.ledger_code)
        .bind(kind)
        .bind(allocation.amount_paise)
        .bind(now())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::store::StoreInput;

    async fn open_store(db: &Database, code: &str) {
        db.stores()
            .insert(&StoreInput {
                store_code: code.to_string(),
                store_name: format!("{} store", code),
                status: true,
                ..Default::default()
            })
            .await
            .unwrap();
        db.stores()
            .open(code, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap())
            .await
            .unwrap();
    }

    fn request(store: &str) -> SaleSaveRequest {
        SaleSaveRequest {
            store_code: store.to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            party_code: "P001".to_string(),
            tender_type: Some("Cash".to_string()),
            user_name: Some("counter1".to_string()),
            items: vec![
                SaleLineInput {
                    item_code: "IT001".into(),
                    size_code: "750".into(),
                    mrp_paise: 52_000,
                    quantity: 2,
                },
                SaleLineInput {
                    item_code: "IT001".into(),
                    size_code: "375".into(),
                    mrp_paise: 26_000,
                    quantity: 1,
                },
            ],
            other_sales: vec![LedgerAllocation {
                ledger_code: "LDG-SODA".into(),
                amount_paise: 5_000,
            }],
            expenses: vec![LedgerAllocation {
                ledger_code: "LDG-TEA".into(),
                amount_paise: 0, // unused row from the grid, must be dropped
            }],
            tenders: vec![LedgerAllocation {
                ledger_code: "LDG-CASH".into(),
                amount_paise: 135_000,
            }],
        }
    }

    #[tokio::test]
    async fn test_save_computes_totals_and_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        open_store(&db, "S001").await;

        let voucher = db.sales().save(&request("S001")).await.unwrap();
        assert_eq!(voucher.invoice_no, "1"); // legacy series, no rule configured
        assert_eq!(voucher.sale_amount_paise, 130_000);
        assert_eq!(voucher.other_sale_paise, 5_000);
        assert_eq!(voucher.expense_paise, 0);
        assert_eq!(voucher.tender_paise, 135_000);

        // stock went outward
        let level = db.stock().get("S001", "IT001", "750").await.unwrap().unwrap();
        assert_eq!(level.outward, 2);
        assert_eq!(level.closing, -2);

        // zero-amount expense row was dropped
        let entries = db
            .sales()
            .ledger_entries_by_store_date("S001", voucher.invoice_date)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.amount_paise != 0));
    }

    #[tokio::test]
    async fn test_closed_store_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.stores()
            .insert(&StoreInput {
                store_code: "S001".into(),
                store_name: "Main".into(),
                status: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let err = db.sales().save(&request("S001")).await.unwrap_err();
        assert!(err.to_string().contains("not open"));
    }

    #[tokio::test]
    async fn test_invoice_numbers_increment() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        open_store(&db, "S001").await;

        let a = db.sales().save(&request("S001")).await.unwrap();
        let b = db.sales().save(&request("S001")).await.unwrap();
        assert_eq!(a.invoice_no, "1");
        assert_eq!(b.invoice_no, "2");

        let day = db
            .sales()
            .list_by_store_date("S001", a.invoice_date)
            .await
            .unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!(
            db.sales()
                .lines_by_store_date("S001", a.invoice_date)
                .await
                .unwrap()
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        open_store(&db, "S001").await;

        let mut bad = request("S001");
        bad.items[0].quantity = 0;
        assert!(db.sales().save(&bad).await.is_err());
    }
}
