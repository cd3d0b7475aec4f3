//! # Purchase Repository
//!
//! Vendor purchase invoices: header + item lines + charge allocations.
//!
//! ## The Allocation Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_amount = purchase_amount + Σ ledger allocations                  │
//! │                                                                         │
//! │  Exact, in paise. A voucher that does not balance is rejected before    │
//! │  anything is written.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Purchased quantities land in the store's stock purchase column inside the
//! same transaction.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now, stock, voucher};
use backbar_core::stock::Movement;
use backbar_core::validation::validate_quantity;
use backbar_core::{
    CoreError, Ledger, PurchaseLedgerEntry, PurchaseLine, PurchaseVoucher, VoucherType,
    MAX_VOUCHER_LINES,
};

/// One item line of the purchase entry grid.
#[derive(Debug, Clone)]
pub struct PurchaseLineInput {
    pub item_code: String,
    pub size_code: String,
    pub price_paise: i64,
    pub quantity: i64,
}

/// One charge allocation (freight, excise duty, discount...).
#[derive(Debug, Clone)]
pub struct PurchaseAllocation {
    pub ledger_code: String,
    pub amount_paise: i64,
}

/// Full purchase-entry payload.
#[derive(Debug, Clone)]
pub struct PurchaseSaveRequest {
    /// Vendor's invoice number; when absent one is allocated from the
    /// PURCHASE series.
    pub invoice_no: Option<String>,
    pub invoice_date: NaiveDate,
    pub store_code: String,
    pub party_code: String,
    /// Full invoice value as printed on the vendor document.
    pub total_amount_paise: i64,
    pub purchase_ledger_code: Option<String>,
    pub narration: Option<String>,
    pub user_name: Option<String>,
    pub items: Vec<PurchaseLineInput>,
    pub allocations: Vec<PurchaseAllocation>,
}

/// Repository for purchase vouchers.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Saves a purchase invoice. Returns the committed header.
    pub async fn save(&self, request: &PurchaseSaveRequest) -> DbResult<PurchaseVoucher> {
        if request.items.len() > MAX_VOUCHER_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_VOUCHER_LINES,
            }
            .into());
        }
        for line in &request.items {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        let purchase_amount: i64 = request
            .items
            .iter()
            .map(|l| l.price_paise * l.quantity)
            .sum();
        let allocated: i64 = request.allocations.iter().map(|a| a.amount_paise).sum();

        if request.total_amount_paise != purchase_amount + allocated {
            return Err(CoreError::AllocationMismatch {
                total_paise: request.total_amount_paise,
                allocated_paise: purchase_amount + allocated,
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let invoice_no = match &request.invoice_no {
            Some(no) if !no.trim().is_empty() => no.trim().to_string(),
            _ => {
                voucher::allocate_number(
                    &mut tx,
                    VoucherType::Purchase,
                    Some(&request.store_code),
                    request.invoice_date,
                )
                .await?
            }
        };

        let voucher_id = new_id();
        let ts = now();

        debug!(invoice_no = %invoice_no, store_code = %request.store_code, "Inserting purchase voucher");

        sqlx::query(
            "INSERT INTO purchase_vouchers
                 (id, invoice_no, invoice_date, store_code, party_code,
                  purchase_amount_paise, total_amount_paise, purchase_ledger_code,
                  narration, user_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(&voucher_id)
        .bind(&invoice_no)
        .bind(request.invoice_date)
        .bind(&request.store_code)
        .bind(&request.party_code)
        .bind(purchase_amount)
        .bind(request.total_amount_paise)
        .bind(&request.purchase_ledger_code)
        .bind(&request.narration)
        .bind(&request.user_name)
        .bind(ts)
        .bind(ts)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Duplicate { .. } => DbError::duplicate("PurchaseVoucher", &invoice_no),
            other => other,
        })?;

        for line in &request.items {
            sqlx::query(
                "INSERT INTO purchase_lines
                     (id, invoice_no, invoice_date, store_code, item_code, size_code,
                      price_paise, quantity, amount_paise, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(new_id())
            .bind(&invoice_no)
            .bind(request.invoice_date)
            .bind(&request.store_code)
            .bind(&line.item_code)
            .bind(&line.size_code)
            .bind(line.price_paise)
            .bind(line.quantity)
            .bind(line.price_paise * line.quantity)
            .bind(ts)
            .execute(&mut *tx)
            .await?;

            stock::apply_movement(
                &mut tx,
                &request.store_code,
                &line.item_code,
                "",
                &line.size_code,
                "",
                request.invoice_date,
                Movement::Purchase(line.quantity),
            )
            .await?;
        }

        for allocation in &request.allocations {
            if allocation.amount_paise == 0 {
                continue;
            }
            // Kind is frozen from the ledger master at save time.
            let ledger = sqlx::query_as::<_, Ledger>("SELECT * FROM ledgers WHERE code = ?1")
                .bind(&allocation.ledger_code)
                .fetch_optional(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO purchase_ledger_entries
                     (id, voucher_id, invoice_no, store_code, ledger_code, kind,
                      amount_paise, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(new_id())
            .bind(&voucher_id)
            .bind(&invoice_no)
            .bind(&request.store_code)
            .bind(&allocation.ledger_code)
            .bind(ledger.map(|l| l.kind))
            .bind(allocation.amount_paise)
            .bind(ts)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(invoice_no = %invoice_no, total_paise = request.total_amount_paise, "Purchase voucher saved");

        self.get_by_invoice(&invoice_no, &request.store_code)
            .await?
            .ok_or_else(|| DbError::not_found("PurchaseVoucher", &invoice_no))
    }

    pub async fn get_by_invoice(
        &self,
        invoice_no: &str,
        store_code: &str,
    ) -> DbResult<Option<PurchaseVoucher>> {
        Ok(sqlx::query_as::<_, PurchaseVoucher>(
            "SELECT * FROM purchase_vouchers WHERE invoice_no = ?1 AND store_code = ?2",
        )
        .bind(invoice_no)
        .bind(store_code)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(&self) -> DbResult<Vec<PurchaseVoucher>> {
        Ok(sqlx::query_as::<_, PurchaseVoucher>(
            "SELECT * FROM purchase_vouchers ORDER BY invoice_date DESC, invoice_no DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn lines_by_invoice(
        &self,
        invoice_no: &str,
        store_code: &str,
    ) -> DbResult<Vec<PurchaseLine>> {
        Ok(sqlx::query_as::<_, PurchaseLine>(
            "SELECT * FROM purchase_lines WHERE invoice_no = ?1 AND store_code = ?2",
        )
        .bind(invoice_no)
        .bind(store_code)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn ledger_entries_by_voucher(
        &self,
        voucher_id: &str,
    ) -> DbResult<Vec<PurchaseLedgerEntry>> {
        Ok(sqlx::query_as::<_, PurchaseLedgerEntry>(
            "SELECT * FROM purchase_ledger_entries WHERE voucher_id = ?1",
        )
        .bind(voucher_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::ledger::LedgerInput;
    use backbar_core::LedgerKind;

    fn request() -> PurchaseSaveRequest {
        PurchaseSaveRequest {
            invoice_no: Some("VINV-881".to_string()),
            invoice_date: NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            store_code: "Head Office".to_string(),
            party_code: "V001".to_string(),
            // 10 × ₹400 + 24 × ₹200 + ₹150 freight = ₹8950
            total_amount_paise: 895_000,
            purchase_ledger_code: Some("LDG-PUR".to_string()),
            narration: Some("January indent".to_string()),
            user_name: Some("storekeeper".to_string()),
            items: vec![
                PurchaseLineInput {
                    item_code: "IT001".into(),
                    size_code: "750".into(),
                    price_paise: 40_000,
                    quantity: 10,
                },
                PurchaseLineInput {
                    item_code: "IT001".into(),
                    size_code: "375".into(),
                    price_paise: 20_000,
                    quantity: 24,
                },
            ],
            allocations: vec![PurchaseAllocation {
                ledger_code: "LDG-FREIGHT".into(),
                amount_paise: 15_000,
            }],
        }
    }

    #[tokio::test]
    async fn test_balanced_purchase_saves_and_moves_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.ledgers()
            .insert(&LedgerInput {
                code: "LDG-FREIGHT".into(),
                name: "Freight".into(),
                kind: LedgerKind::Expense,
                screen: Some("Purchase".into()),
                sort_order: 0,
                status: true,
            })
            .await
            .unwrap();

        let voucher = db.purchases().save(&request()).await.unwrap();
        assert_eq!(voucher.invoice_no, "VINV-881");
        assert_eq!(voucher.purchase_amount_paise, 880_000);
        assert_eq!(voucher.total_amount_paise, 895_000);

        let level = db
            .stock()
            .get("Head Office", "IT001", "750")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(level.purchase, 10);
        assert_eq!(level.closing, 10);

        // allocation kind frozen from the ledger master
        let entries = db.purchases().ledger_entries_by_voucher(&voucher.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, Some(LedgerKind::Expense));
    }

    #[tokio::test]
    async fn test_unbalanced_purchase_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut bad = request();
        bad.total_amount_paise = 900_000; // off by ₹50
        let err = db.purchases().save(&bad).await.unwrap_err();
        assert!(err.to_string().contains("does not match"));

        // nothing was written
        assert!(db.purchases().list().await.unwrap().is_empty());
        assert!(db.stock().get("Head Office", "IT001", "750").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generated_invoice_number_when_absent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut req = request();
        req.invoice_no = None;
        let voucher = db.purchases().save(&req).await.unwrap();
        assert_eq!(voucher.invoice_no, "1"); // legacy series, no rule
    }
}
