//! # Stock Transfer Repository
//!
//! Transfer-out (dispatch) and transfer-in (receipt) vouchers.
//!
//! ## Pairing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source store                           Destination store               │
//! │  ───────────                            ─────────────────               │
//! │  save_out()                             pending_for() lists PENDING     │
//! │   ├── STO number allocated               STOs addressed to the store    │
//! │   ├── stock outward at source                 │                         │
//! │   ├── STO status PENDING                      ▼                         │
//! │   └── DSR outward refreshed             save_in(sto_number)             │
//! │                                          ├── STI number allocated       │
//! │                                          ├── stock inward at dest       │
//! │                                          ├── STO marked RECEIVED        │
//! │                                          └── DSR inward refreshed       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::dsr::DsrRepository;
use crate::repository::{new_id, now, stock, voucher};
use backbar_core::stock::Movement;
use backbar_core::validation::validate_quantity;
use backbar_core::{
    CoreError, TransferIn, TransferInLine, TransferLine, TransferOut, TransferStatus, VoucherType,
    MAX_VOUCHER_LINES,
};

/// One line of the transfer-out entry grid.
#[derive(Debug, Clone)]
pub struct TransferLineInput {
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub quantity: i64,
    pub price_paise: i64,
}

/// Transfer-out save payload.
#[derive(Debug, Clone)]
pub struct TransferOutRequest {
    pub transfer_date: NaiveDate,
    pub from_store: String,
    pub to_store: String,
    pub user_name: Option<String>,
    pub narration: Option<String>,
    pub lines: Vec<TransferLineInput>,
}

/// Transfer-in (receipt) save payload. Quantities may differ from the STO
/// when cases arrive short or broken.
#[derive(Debug, Clone)]
pub struct TransferInRequest {
    pub transfer_date: NaiveDate,
    pub sto_number: String,
    pub user_name: Option<String>,
    pub narration: Option<String>,
    pub lines: Vec<TransferLineInput>,
}

/// Repository for stock transfers.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    // =========================================================================
    // Transfer out
    // =========================================================================

    /// Saves a dispatch voucher. Returns the committed header.
    pub async fn save_out(&self, request: &TransferOutRequest) -> DbResult<TransferOut> {
        if request.lines.len() > MAX_VOUCHER_LINES {
            return Err(CoreError::TooManyLines {
                max: MAX_VOUCHER_LINES,
            }
            .into());
        }
        for line in &request.lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        let mut tx = self.pool.begin().await?;

        let sto_number = voucher::allocate_number(
            &mut tx,
            VoucherType::StockTransferOut,
            Some(&request.from_store),
            request.transfer_date,
        )
        .await?;

        let ts = now();
        debug!(sto_number = %sto_number, from = %request.from_store, to = %request.to_store, "Inserting transfer out");

        sqlx::query(
            "INSERT INTO transfer_out
                 (id, sto_number, transfer_date, from_store, to_store, user_name,
                  narration, received_status, received_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10)",
        )
        .bind(new_id())
        .bind(&sto_number)
        .bind(request.transfer_date)
        .bind(&request.from_store)
        .bind(&request.to_store)
        .bind(&request.user_name)
        .bind(&request.narration)
        .bind(TransferStatus::Pending)
        .bind(ts)
        .bind(ts)
        .execute(&mut *tx)
        .await?;

        for line in &request.lines {
            sqlx::query(
                "INSERT INTO transfer_out_lines
                     (id, sto_number, transfer_date, from_store, to_store, item_code,
                      item_name, size_code, size_name, quantity, price_paise, amount_paise,
                      created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )
            .bind(new_id())
            .bind(&sto_number)
            .bind(request.transfer_date)
            .bind(&request.from_store)
            .bind(&request.to_store)
            .bind(&line.item_code)
            .bind(&line.item_name)
            .bind(&line.size_code)
            .bind(&line.size_name)
            .bind(line.quantity)
            .bind(line.price_paise)
            .bind(line.price_paise * line.quantity)
            .bind(ts)
            .execute(&mut *tx)
            .await?;

            // Dispatch leaves the source store as stock outward.
            stock::apply_movement(
                &mut tx,
                &request.from_store,
                &line.item_code,
                &line.item_name,
                &line.size_code,
                &line.size_name,
                request.transfer_date,
                Movement::Outward(line.quantity),
            )
            .await?;
        }

        tx.commit().await?;
        info!(sto_number = %sto_number, "Transfer out saved");

        // Refresh the source store's DSR outward column.
        DsrRepository::new(self.pool.clone())
            .populate_after_voucher(
                &request.from_store,
                request.transfer_date,
                request.user_name.as_deref(),
            )
            .await;

        self.get_out(&sto_number)
            .await?
            .ok_or_else(|| DbError::not_found("TransferOut", &sto_number))
            .map(|(head, _)| head)
    }

    pub async fn list_out(&self) -> DbResult<Vec<TransferOut>> {
        Ok(sqlx::query_as::<_, TransferOut>(
            "SELECT * FROM transfer_out ORDER BY transfer_date DESC, sto_number DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// One STO with its lines.
    pub async fn get_out(
        &self,
        sto_number: &str,
    ) -> DbResult<Option<(TransferOut, Vec<TransferLine>)>> {
        let head = sqlx::query_as::<_, TransferOut>(
            "SELECT * FROM transfer_out WHERE sto_number = ?1",
        )
        .bind(sto_number)
        .fetch_optional(&self.pool)
        .await?;

        let Some(head) = head else {
            return Ok(None);
        };

        let lines = self.out_lines(sto_number).await?;
        Ok(Some((head, lines)))
    }

    pub async fn out_lines(&self, sto_number: &str) -> DbResult<Vec<TransferLine>> {
        Ok(sqlx::query_as::<_, TransferLine>(
            "SELECT * FROM transfer_out_lines WHERE sto_number = ?1
             ORDER BY item_name COLLATE NOCASE, size_name COLLATE NOCASE",
        )
        .bind(sto_number)
        .fetch_all(&self.pool)
        .await?)
    }

    /// PENDING dispatches addressed to a store, optionally for one date.
    pub async fn pending_for(
        &self,
        to_store: &str,
        date: Option<NaiveDate>,
    ) -> DbResult<Vec<TransferOut>> {
        let rows = match date {
            Some(date) => {
                sqlx::query_as::<_, TransferOut>(
                    "SELECT * FROM transfer_out
                     WHERE to_store = ?1 AND received_status = ?2 AND transfer_date = ?3
                     ORDER BY sto_number",
                )
                .bind(to_store)
                .bind(TransferStatus::Pending)
                .bind(date)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TransferOut>(
                    "SELECT * FROM transfer_out
                     WHERE to_store = ?1 AND received_status = ?2
                     ORDER BY transfer_date, sto_number",
                )
                .bind(to_store)
                .bind(TransferStatus::Pending)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    // =========================================================================
    // Transfer in
    // =========================================================================

    /// Books a receipt against a pending STO. Returns the committed header.
    pub async fn save_in(&self, request: &TransferInRequest) -> DbResult<TransferIn> {
        for line in &request.lines {
            validate_quantity(line.quantity).map_err(CoreError::from)?;
        }

        let (sto, _) = self
            .get_out(&request.sto_number)
            .await?
            .ok_or_else(|| DbError::not_found("TransferOut", &request.sto_number))?;

        let mut tx = self.pool.begin().await?;

        let sti_number = voucher::allocate_number(
            &mut tx,
            VoucherType::StockTransferIn,
            Some(&sto.to_store),
            request.transfer_date,
        )
        .await?;

        let ts = now();
        debug!(sti_number = %sti_number, sto_number = %request.sto_number, "Inserting transfer in");

        sqlx::query(
            "INSERT INTO transfer_in
                 (id, sti_number, transfer_date, sto_number, from_store, to_store,
                  user_name, narration, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(new_id())
        .bind(&sti_number)
        .bind(request.transfer_date)
        .bind(&request.sto_number)
        .bind(&sto.from_store)
        .bind(&sto.to_store)
        .bind(&request.user_name)
        .bind(&request.narration)
        .bind(ts)
        .execute(&mut *tx)
        .await?;

        for line in &request.lines {
            sqlx::query(
                "INSERT INTO transfer_in_lines
                     (id, sti_number, transfer_date, to_store, item_code, item_name,
                      size_code, size_name, quantity, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .bind(new_id())
            .bind(&sti_number)
            .bind(request.transfer_date)
            .bind(&sto.to_store)
            .bind(&line.item_code)
            .bind(&line.item_name)
            .bind(&line.size_code)
            .bind(&line.size_name)
            .bind(line.quantity)
            .bind(ts)
            .execute(&mut *tx)
            .await?;

            // Receipt lands in the destination store as stock inward.
            stock::apply_movement(
                &mut tx,
                &sto.to_store,
                &line.item_code,
                &line.item_name,
                &line.size_code,
                &line.size_name,
                request.transfer_date,
                Movement::Inward(line.quantity),
            )
            .await?;
        }

        sqlx::query(
            "UPDATE transfer_out
             SET received_status = ?1, received_by = ?2, updated_at = ?3
             WHERE sto_number = ?4",
        )
        .bind(TransferStatus::Received)
        .bind(&request.user_name)
        .bind(ts)
        .bind(&request.sto_number)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(sti_number = %sti_number, sto_number = %request.sto_number, "Transfer in saved");

        // Refresh the destination store's DSR inward column.
        DsrRepository::new(self.pool.clone())
            .populate_after_voucher(
                &sto.to_store,
                request.transfer_date,
                request.user_name.as_deref(),
            )
            .await;

        let saved = sqlx::query_as::<_, TransferIn>(
            "SELECT * FROM transfer_in WHERE sti_number = ?1",
        )
        .bind(&sti_number)
        .fetch_optional(&self.pool)
        .await?;

        saved.ok_or_else(|| DbError::not_found("TransferIn", &sti_number))
    }

    pub async fn list_in(&self) -> DbResult<Vec<TransferIn>> {
        Ok(sqlx::query_as::<_, TransferIn>(
            "SELECT * FROM transfer_in ORDER BY transfer_date DESC, sti_number DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn in_lines(&self, sti_number: &str) -> DbResult<Vec<TransferInLine>> {
        Ok(sqlx::query_as::<_, TransferInLine>(
            "SELECT * FROM transfer_in_lines WHERE sti_number = ?1",
        )
        .bind(sti_number)
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
    use crate::repository::stock::OpeningStockInput;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    fn line(qty: i64) -> TransferLineInput {
        TransferLineInput {
            item_code: "IT001".into(),
            item_name: "Old Oak Whisky".into(),
            size_code: "750".into(),
            size_name: "750ml".into(),
            quantity: qty,
            price_paise: 40_000,
        }
    }

    fn out_request(qty: i64) -> TransferOutRequest {
        TransferOutRequest {
            transfer_date: date(),
            from_store: "Head Office".into(),
            to_store: "S001".into(),
            user_name: Some("warehouse".into()),
            narration: None,
            lines: vec![line(qty)],
        }
    }

    async fn seed_warehouse(db: &Database) {
        db.stock()
            .save_opening(&[OpeningStockInput {
                store_code: "Head Office".into(),
                item_code: "IT001".into(),
                item_name: "Old Oak Whisky".into(),
                size_code: "750".into(),
                size_name: "750ml".into(),
                business_date: Some(date()),
                opening: 100,
            }])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_out_then_in_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_warehouse(&db).await;

        let sto = db.transfers().save_out(&out_request(12)).await.unwrap();
        assert_eq!(sto.received_status, TransferStatus::Pending);

        // source stock went down
        let source = db.stock().get("Head Office", "IT001", "750").await.unwrap().unwrap();
        assert_eq!(source.outward, 12);
        assert_eq!(source.closing, 88);

        // destination sees it pending
        let pending = db.transfers().pending_for("S001", Some(date())).await.unwrap();
        assert_eq!(pending.len(), 1);

        let sti = db
            .transfers()
            .save_in(&TransferInRequest {
                transfer_date: date(),
                sto_number: sto.sto_number.clone(),
                user_name: Some("counter1".into()),
                narration: None,
                lines: vec![line(12)],
            })
            .await
            .unwrap();
        assert_eq!(sti.from_store, "Head Office");
        assert_eq!(sti.to_store, "S001");

        // destination stock went up
        let dest = db.stock().get("S001", "IT001", "750").await.unwrap().unwrap();
        assert_eq!(dest.inward, 12);
        assert_eq!(dest.closing, 12);

        // STO flipped to RECEIVED and left the pending list
        let (sto, _) = db.transfers().get_out(&sto.sto_number).await.unwrap().unwrap();
        assert_eq!(sto.received_status, TransferStatus::Received);
        assert_eq!(sto.received_by.as_deref(), Some("counter1"));
        assert!(db.transfers().pending_for("S001", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transfers_feed_dsr_columns() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_warehouse(&db).await;

        let sto = db.transfers().save_out(&out_request(12)).await.unwrap();

        // source DSR picked up the outward
        let source_lines = db.dsr().lines("Head Office", date()).await.unwrap();
        assert_eq!(source_lines.len(), 1);
        assert_eq!(source_lines[0].outward, 12);

        db.transfers()
            .save_in(&TransferInRequest {
                transfer_date: date(),
                sto_number: sto.sto_number,
                user_name: None,
                narration: None,
                lines: vec![line(12)],
            })
            .await
            .unwrap();

        // destination DSR picked up the inward
        let dest_lines = db.dsr().lines("S001", date()).await.unwrap();
        assert_eq!(dest_lines.len(), 1);
        assert_eq!(dest_lines[0].inward, 12);
    }

    #[tokio::test]
    async fn test_receipt_against_unknown_sto_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .transfers()
            .save_in(&TransferInRequest {
                transfer_date: date(),
                sto_number: "STO-404".into(),
                user_name: None,
                narration: None,
                lines: vec![line(1)],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_short_receipt_books_received_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_warehouse(&db).await;

        let sto = db.transfers().save_out(&out_request(12)).await.unwrap();
        // two bottles broke in transit
        db.transfers()
            .save_in(&TransferInRequest {
                transfer_date: date(),
                sto_number: sto.sto_number,
                user_name: None,
                narration: Some("2 broken".into()),
                lines: vec![line(10)],
            })
            .await
            .unwrap();

        let dest = db.stock().get("S001", "IT001", "750").await.unwrap().unwrap();
        assert_eq!(dest.inward, 10);
    }
}
