//! # Daily Sale Report Repository
//!
//! Persistence for DSR headers and item × size lines.
//!
//! ## Population vs Submission
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  populate(store, date)  - store open / transfer save                    │
//! │    ├── header ensured (status NEW)                                      │
//! │    ├── one line per stocked item × size                                 │
//! │    │     opening ← stock closing, prices ← price master                 │
//! │    └── inward/outward refreshed from the day's transfer lines           │
//! │                                                                         │
//! │  save(request)          - the DSR screen's submit                       │
//! │    ├── header upserted (status SUBMITTED)                               │
//! │    ├── edited counts applied per line                                   │
//! │    └── closing recomputed: opening + inward - outward - sale            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::dsr::line_closing;
use backbar_core::{DsrHeader, DsrLine, DsrStatus, PriceEntry, StockLevel};

/// One edited row from the DSR screen. `None` fields are left untouched.
#[derive(Debug, Clone)]
pub struct DsrDetailInput {
    pub item_code: String,
    pub size_code: String,
    pub inward: Option<i64>,
    pub outward: Option<i64>,
    pub sale: Option<i64>,
}

/// The DSR screen's submit payload.
#[derive(Debug, Clone)]
pub struct DsrSaveRequest {
    pub store_code: String,
    pub dsr_date: NaiveDate,
    pub user_name: Option<String>,
    pub details: Vec<DsrDetailInput>,
}

/// Repository for the Daily Sale Report.
#[derive(Debug, Clone)]
pub struct DsrRepository {
    pool: SqlitePool,
}

impl DsrRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DsrRepository { pool }
    }

    /// Report status for a store-day; PENDING when no header exists.
    pub async fn status(&self, store_code: &str, date: NaiveDate) -> DbResult<DsrStatus> {
        Ok(self
            .header(store_code, date)
            .await?
            .map(|h| h.status)
            .unwrap_or(DsrStatus::Pending))
    }

    pub async fn header(&self, store_code: &str, date: NaiveDate) -> DbResult<Option<DsrHeader>> {
        Ok(sqlx::query_as::<_, DsrHeader>(
            "SELECT * FROM dsr_headers WHERE store_code = ?1 AND dsr_date = ?2",
        )
        .bind(store_code)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Lines for a store-day, ordered for the screen grid.
    pub async fn lines(&self, store_code: &str, date: NaiveDate) -> DbResult<Vec<DsrLine>> {
        Ok(sqlx::query_as::<_, DsrLine>(
            "SELECT * FROM dsr_lines WHERE store_code = ?1 AND dsr_date = ?2
             ORDER BY item_name COLLATE NOCASE, size_name COLLATE NOCASE",
        )
        .bind(store_code)
        .bind(date)
        .fetch_all(&self.pool)
        .await?)
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Seeds/refreshes the store-day report from stock and transfer data.
    ///
    /// Idempotent: safe to call on every store open and after every transfer
    /// save. Existing lines keep their opening and sale counts; only
    /// inward/outward are refreshed from the day's transfer lines.
    pub async fn populate(
        &self,
        store_code: &str,
        date: NaiveDate,
        user_name: Option<&str>,
    ) -> DbResult<()> {
        info!(store_code = %store_code, %date, "Populating DSR");

        let mut tx = self.pool.begin().await?;
        let ts = now();

        // 0. Ensure the header exists.
        let header = sqlx::query_as::<_, DsrHeader>(
            "SELECT * FROM dsr_headers WHERE store_code = ?1 AND dsr_date = ?2",
        )
        .bind(store_code)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

        match header {
            None => {
                sqlx::query(
                    "INSERT INTO dsr_headers
                         (id, store_code, dsr_date, user_name, status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .bind(new_id())
                .bind(store_code)
                .bind(date)
                .bind(user_name)
                .bind(DsrStatus::New)
                .bind(ts)
                .bind(ts)
                .execute(&mut *tx)
                .await?;
            }
            Some(existing) => {
                if let Some(user) = user_name {
                    if existing.user_name.as_deref() != Some(user) {
                        sqlx::query(
                            "UPDATE dsr_headers SET user_name = ?1, updated_at = ?2 WHERE id = ?3",
                        )
                        .bind(user)
                        .bind(ts)
                        .bind(&existing.id)
                        .execute(&mut *tx)
                        .await?;
                    }
                }
            }
        }

        // 1. The day's transfer movements, keyed by item × size.
        let inward_map = sum_by_item_size(
            sqlx::query_as::<_, (String, String, i64)>(
                "SELECT item_code, size_code, quantity FROM transfer_in_lines
                 WHERE to_store = ?1 AND transfer_date = ?2",
            )
            .bind(store_code)
            .bind(date)
            .fetch_all(&mut *tx)
            .await?,
        );

        let outward_map = sum_by_item_size(
            sqlx::query_as::<_, (String, String, i64)>(
                "SELECT item_code, size_code, quantity FROM transfer_out_lines
                 WHERE from_store = ?1 AND transfer_date = ?2",
            )
            .bind(store_code)
            .bind(date)
            .fetch_all(&mut *tx)
            .await?,
        );

        // 2. One line per stocked item × size.
        let stock_rows = sqlx::query_as::<_, StockLevel>(
            "SELECT * FROM stock_levels WHERE store_code = ?1",
        )
        .bind(store_code)
        .fetch_all(&mut *tx)
        .await?;

        debug!(count = stock_rows.len(), "Stock rows feeding DSR population");

        for stock_row in &stock_rows {
            let key = (stock_row.item_code.clone(), stock_row.size_code.clone());
            let inward = inward_map.get(&key).copied().unwrap_or(0);
            let outward = outward_map.get(&key).copied().unwrap_or(0);

            let existing = sqlx::query_as::<_, DsrLine>(
                "SELECT * FROM dsr_lines
                 WHERE store_code = ?1 AND dsr_date = ?2 AND item_code = ?3 AND size_code = ?4",
            )
            .bind(store_code)
            .bind(date)
            .bind(&stock_row.item_code)
            .bind(&stock_row.size_code)
            .fetch_optional(&mut *tx)
            .await?;

            match existing {
                Some(line) => {
                    if line.inward != inward || line.outward != outward {
                        let closing = line_closing(line.opening, inward, outward, line.sale);
                        sqlx::query(
                            "UPDATE dsr_lines
                             SET inward = ?1, outward = ?2, closing = ?3, updated_at = ?4
                             WHERE id = ?5",
                        )
                        .bind(inward)
                        .bind(outward)
                        .bind(closing)
                        .bind(ts)
                        .bind(&line.id)
                        .execute(&mut *tx)
                        .await?;
                    }
                }
                None => {
                    let price = sqlx::query_as::<_, PriceEntry>(
                        "SELECT * FROM price_master WHERE item_code = ?1 AND size_code = ?2",
                    )
                    .bind(&stock_row.item_code)
                    .bind(&stock_row.size_code)
                    .fetch_optional(&mut *tx)
                    .await?;

                    // Yesterday's closing stock becomes today's opening.
                    let opening = stock_row.closing;
                    let closing = line_closing(opening, inward, outward, 0);

                    sqlx::query(
                        "INSERT INTO dsr_lines
                             (id, store_code, dsr_date, item_code, item_name, size_code,
                              size_name, purchase_price_paise, mrp_paise, opening, inward,
                              outward, sale, closing, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0, ?13, ?14, ?15)",
                    )
                    .bind(new_id())
                    .bind(store_code)
                    .bind(date)
                    .bind(&stock_row.item_code)
                    .bind(&stock_row.item_name)
                    .bind(&stock_row.size_code)
                    .bind(&stock_row.size_name)
                    .bind(price.as_ref().map(|p| p.purchase_price_paise).unwrap_or(0))
                    .bind(price.as_ref().map(|p| p.mrp_paise).unwrap_or(0))
                    .bind(opening)
                    .bind(inward)
                    .bind(outward)
                    .bind(closing)
                    .bind(ts)
                    .bind(ts)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Best-effort population after a voucher save.
    ///
    /// The voucher itself is already committed; a DSR refresh failure is
    /// logged and swallowed so the entry screen still gets its success.
    pub async fn populate_after_voucher(
        &self,
        store_code: &str,
        date: NaiveDate,
        user_name: Option<&str>,
    ) {
        if let Err(err) = self.populate(store_code, date, user_name).await {
            warn!(store_code = %store_code, %date, error = %err, "DSR refresh after voucher failed");
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Applies the DSR screen's submit: header to SUBMITTED, edited counts in,
    /// closings recomputed.
    pub async fn save(&self, request: &DsrSaveRequest) -> DbResult<DsrHeader> {
        if request.store_code.trim().is_empty() {
            return Err(DbError::not_found("Store", ""));
        }

        let mut tx = self.pool.begin().await?;
        let ts = now();

        // 1. Upsert header as SUBMITTED.
        sqlx::query(
            "INSERT INTO dsr_headers
                 (id, store_code, dsr_date, user_name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (store_code, dsr_date) DO UPDATE SET
                 user_name = excluded.user_name,
                 status = excluded.status,
                 updated_at = excluded.updated_at",
        )
        .bind(new_id())
        .bind(&request.store_code)
        .bind(request.dsr_date)
        .bind(&request.user_name)
        .bind(DsrStatus::Submitted)
        .bind(ts)
        .bind(ts)
        .execute(&mut *tx)
        .await?;

        // 2. Apply edited rows.
        for detail in &request.details {
            let existing = sqlx::query_as::<_, DsrLine>(
                "SELECT * FROM dsr_lines
                 WHERE store_code = ?1 AND dsr_date = ?2 AND item_code = ?3 AND size_code = ?4",
            )
            .bind(&request.store_code)
            .bind(request.dsr_date)
            .bind(&detail.item_code)
            .bind(&detail.size_code)
            .fetch_optional(&mut *tx)
            .await?;

            match existing {
                Some(mut line) => {
                    if let Some(inward) = detail.inward {
                        line.inward = inward;
                    }
                    if let Some(outward) = detail.outward {
                        line.outward = outward;
                    }
                    if let Some(sale) = detail.sale {
                        line.sale = sale;
                    }
                    line.recompute_closing();

                    sqlx::query(
                        "UPDATE dsr_lines
                         SET inward = ?1, outward = ?2, sale = ?3, closing = ?4, updated_at = ?5
                         WHERE id = ?6",
                    )
                    .bind(line.inward)
                    .bind(line.outward)
                    .bind(line.sale)
                    .bind(line.closing)
                    .bind(ts)
                    .bind(&line.id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    // Unpopulated row: seed it from stock + prices, then apply.
                    let stock_row = sqlx::query_as::<_, StockLevel>(
                        "SELECT * FROM stock_levels
                         WHERE store_code = ?1 AND item_code = ?2 AND size_code = ?3",
                    )
                    .bind(&request.store_code)
                    .bind(&detail.item_code)
                    .bind(&detail.size_code)
                    .fetch_optional(&mut *tx)
                    .await?;

                    // Nothing known about this item in this store: skip,
                    // matching the screen which only shows stocked rows.
                    let Some(stock_row) = stock_row else {
                        continue;
                    };

                    let price = sqlx::query_as::<_, PriceEntry>(
                        "SELECT * FROM price_master WHERE item_code = ?1 AND size_code = ?2",
                    )
                    .bind(&detail.item_code)
                    .bind(&detail.size_code)
                    .fetch_optional(&mut *tx)
                    .await?;

                    let opening = stock_row.closing;
                    let inward = detail.inward.unwrap_or(0);
                    let outward = detail.outward.unwrap_or(0);
                    let sale = detail.sale.unwrap_or(0);
                    let closing = line_closing(opening, inward, outward, sale);

                    sqlx::query(
                        "INSERT INTO dsr_lines
                             (id, store_code, dsr_date, item_code, item_name, size_code,
                              size_name, purchase_price_paise, mrp_paise, opening, inward,
                              outward, sale, closing, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                    )
                    .bind(new_id())
                    .bind(&request.store_code)
                    .bind(request.dsr_date)
                    .bind(&detail.item_code)
                    .bind(&stock_row.item_name)
                    .bind(&detail.size_code)
                    .bind(&stock_row.size_name)
                    .bind(price.as_ref().map(|p| p.purchase_price_paise).unwrap_or(0))
                    .bind(price.as_ref().map(|p| p.mrp_paise).unwrap_or(0))
                    .bind(opening)
                    .bind(inward)
                    .bind(outward)
                    .bind(sale)
                    .bind(closing)
                    .bind(ts)
                    .bind(ts)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;

        info!(store_code = %request.store_code, date = %request.dsr_date, "DSR submitted");

        self.header(&request.store_code, request.dsr_date)
            .await?
            .ok_or_else(|| DbError::not_found("DsrHeader", &request.store_code))
    }
}

fn sum_by_item_size(rows: Vec<(String, String, i64)>) -> HashMap<(String, String), i64> {
    let mut map: HashMap<(String, String), i64> = HashMap::new();
    for (item_code, size_code, quantity) in rows {
        *map.entry((item_code, size_code)).or_insert(0) += quantity;
    }
    map
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::price::PriceInput;
    use crate::repository::stock::OpeningStockInput;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    async fn seed_stock(db: &Database) {
        db.stock()
            .save_opening(&[OpeningStockInput {
                store_code: "S001".into(),
                item_code: "IT001".into(),
                item_name: "Old Oak Whisky".into(),
                size_code: "750".into(),
                size_name: "750ml".into(),
                business_date: Some(date()),
                opening: 24,
            }])
            .await
            .unwrap();
        db.prices()
            .upsert(&PriceInput {
                item_code: "IT001".into(),
                item_name: "Old Oak Whisky".into(),
                size_code: "750".into(),
                size_name: "750ml".into(),
                purchase_price_paise: 40_000,
                mrp_paise: 52_000,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_status_pending_without_header() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let status = db.dsr().status("S001", date()).await.unwrap();
        assert_eq!(status, DsrStatus::Pending);
    }

    #[tokio::test]
    async fn test_populate_seeds_lines_from_stock_and_prices() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_stock(&db).await;

        db.dsr().populate("S001", date(), Some("opener")).await.unwrap();

        assert_eq!(db.dsr().status("S001", date()).await.unwrap(), DsrStatus::New);
        let lines = db.dsr().lines("S001", date()).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].opening, 24);
        assert_eq!(lines[0].mrp_paise, 52_000);
        assert_eq!(lines[0].closing, 24);

        // idempotent
        db.dsr().populate("S001", date(), Some("opener")).await.unwrap();
        assert_eq!(db.dsr().lines("S001", date()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_recomputes_closing_and_submits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_stock(&db).await;
        db.dsr().populate("S001", date(), None).await.unwrap();

        let header = db
            .dsr()
            .save(&DsrSaveRequest {
                store_code: "S001".into(),
                dsr_date: date(),
                user_name: Some("counter1".into()),
                details: vec![DsrDetailInput {
                    item_code: "IT001".into(),
                    size_code: "750".into(),
                    inward: Some(12),
                    outward: Some(2),
                    sale: Some(9),
                }],
            })
            .await
            .unwrap();

        assert_eq!(header.status, DsrStatus::Submitted);
        assert_eq!(header.user_name.as_deref(), Some("counter1"));

        let lines = db.dsr().lines("S001", date()).await.unwrap();
        assert_eq!(lines[0].inward, 12);
        assert_eq!(lines[0].outward, 2);
        assert_eq!(lines[0].sale, 9);
        assert_eq!(lines[0].closing, 24 + 12 - 2 - 9);
    }

    #[tokio::test]
    async fn test_save_partial_edit_keeps_other_columns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_stock(&db).await;
        db.dsr().populate("S001", date(), None).await.unwrap();

        db.dsr()
            .save(&DsrSaveRequest {
                store_code: "S001".into(),
                dsr_date: date(),
                user_name: None,
                details: vec![DsrDetailInput {
                    item_code: "IT001".into(),
                    size_code: "750".into(),
                    inward: None,
                    outward: None,
                    sale: Some(5),
                }],
            })
            .await
            .unwrap();

        let lines = db.dsr().lines("S001", date()).await.unwrap();
        assert_eq!(lines[0].sale, 5);
        assert_eq!(lines[0].inward, 0);
        assert_eq!(lines[0].closing, 19);
    }

    #[tokio::test]
    async fn test_save_seeds_unpopulated_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_stock(&db).await;
        // no populate() call: the save must seed the row itself

        db.dsr()
            .save(&DsrSaveRequest {
                store_code: "S001".into(),
                dsr_date: date(),
                user_name: None,
                details: vec![DsrDetailInput {
                    item_code: "IT001".into(),
                    size_code: "750".into(),
                    inward: None,
                    outward: None,
                    sale: Some(3),
                }],
            })
            .await
            .unwrap();

        let lines = db.dsr().lines("S001", date()).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].opening, 24); // stock closing became opening
        assert_eq!(lines[0].closing, 21);
        assert_eq!(lines[0].purchase_price_paise, 40_000);
    }

    #[tokio::test]
    async fn test_save_skips_unknown_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_stock(&db).await;

        db.dsr()
            .save(&DsrSaveRequest {
                store_code: "S001".into(),
                dsr_date: date(),
                user_name: None,
                details: vec![DsrDetailInput {
                    item_code: "NOPE".into(),
                    size_code: "750".into(),
                    inward: None,
                    outward: None,
                    sale: Some(3),
                }],
            })
            .await
            .unwrap();

        assert!(db.dsr().lines("S001", date()).await.unwrap().is_empty());
    }
}
