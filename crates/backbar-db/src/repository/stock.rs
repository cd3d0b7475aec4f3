//! # Stock Repository
//!
//! Running stock positions per store × item × size.
//!
//! Voucher repositories apply their movements through
//! [`apply_movement`] inside their own transactions, so a failed voucher
//! never leaves a half-updated stock row behind.

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{new_id, now};
use backbar_core::stock::{self, Movement, StockColumns};
use backbar_core::{StockLevel, HEAD_OFFICE_STORE, HO_STORE_ALIAS};

/// One opening-stock row from the entry screen or Excel import.
#[derive(Debug, Clone)]
pub struct OpeningStockInput {
    pub store_code: String,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub business_date: Option<NaiveDate>,
    pub opening: i64,
}

/// A typeahead hit from the stocked-item search.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct StockedItem {
    pub item_code: String,
    pub item_name: String,
}

/// Repository for stock levels.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    pub async fn list_for_store(&self, store_code: &str) -> DbResult<Vec<StockLevel>> {
        Ok(sqlx::query_as::<_, StockLevel>(
            "SELECT * FROM stock_levels WHERE store_code = ?1
             ORDER BY item_name COLLATE NOCASE, size_name COLLATE NOCASE",
        )
        .bind(store_code)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get(
        &self,
        store_code: &str,
        item_code: &str,
        size_code: &str,
    ) -> DbResult<Option<StockLevel>> {
        Ok(sqlx::query_as::<_, StockLevel>(
            "SELECT * FROM stock_levels
             WHERE store_code = ?1 AND item_code = ?2 AND size_code = ?3",
        )
        .bind(store_code)
        .bind(item_code)
        .bind(size_code)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Closing stock for one store × item × size; 0 when no row exists.
    ///
    /// `HO` falls back to the canonical head-office store code, matching how
    /// the purchase screen looks up warehouse stock.
    pub async fn closing_stock(
        &self,
        store_code: &str,
        item_code: &str,
        size_code: &str,
    ) -> DbResult<i64> {
        let mut level = self.get(store_code, item_code, size_code).await?;
        if level.is_none() && store_code == HO_STORE_ALIAS {
            level = self.get(HEAD_OFFICE_STORE, item_code, size_code).await?;
        }
        Ok(level.map(|l| l.closing).unwrap_or(0))
    }

    /// Closing stock for every size of one item, as `(size_code, closing)`.
    pub async fn closing_stock_by_item(
        &self,
        store_code: &str,
        item_code: &str,
    ) -> DbResult<Vec<(String, i64)>> {
        let mut rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT size_code, closing FROM stock_levels
             WHERE store_code = ?1 AND item_code = ?2",
        )
        .bind(store_code)
        .bind(item_code)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() && store_code == HO_STORE_ALIAS {
            rows = sqlx::query_as(
                "SELECT size_code, closing FROM stock_levels
                 WHERE store_code = ?1 AND item_code = ?2",
            )
            .bind(HEAD_OFFICE_STORE)
            .bind(item_code)
            .fetch_all(&self.pool)
            .await?;
        }

        Ok(rows)
    }

    /// Typeahead over items that have positive stock in a store.
    pub async fn search_available_items(
        &self,
        store_code: &str,
        query: &str,
    ) -> DbResult<Vec<StockedItem>> {
        let like = format!("%{}%", query.trim());
        Ok(sqlx::query_as::<_, StockedItem>(
            "SELECT DISTINCT item_code, item_name FROM stock_levels
             WHERE store_code = ?1 AND closing > 0
               AND (item_code LIKE ?2 OR item_name LIKE ?2)
             ORDER BY item_name COLLATE NOCASE
             LIMIT 20",
        )
        .bind(store_code)
        .bind(like)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Saves opening-stock rows.
    ///
    /// Existing rows have their opening restated (closing shifts by the
    /// delta, preserving booked movements); new rows start clean at the
    /// given opening.
    pub async fn save_opening(&self, inputs: &[OpeningStockInput]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for input in inputs {
            debug!(
                store_code = %input.store_code,
                item_code = %input.item_code,
                size_code = %input.size_code,
                opening = input.opening,
                "Saving opening stock"
            );

            let existing = sqlx::query_as::<_, StockLevel>(
                "SELECT * FROM stock_levels
                 WHERE store_code = ?1 AND item_code = ?2 AND size_code = ?3",
            )
            .bind(&input.store_code)
            .bind(&input.item_code)
            .bind(&input.size_code)
            .fetch_optional(&mut *tx)
            .await?;

            match existing {
                Some(level) => {
                    let mut cols = StockColumns {
                        opening: level.opening,
                        purchase: level.purchase,
                        inward: level.inward,
                        outward: level.outward,
                        closing: level.closing,
                    };
                    stock::restate_opening(&mut cols, input.opening);

                    sqlx::query(
                        "UPDATE stock_levels
                         SET opening = ?1, closing = ?2,
                             business_date = COALESCE(?3, business_date), updated_at = ?4
                         WHERE id = ?5",
                    )
                    .bind(cols.opening)
                    .bind(cols.closing)
                    .bind(input.business_date)
                    .bind(now())
                    .bind(&level.id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    let ts = now();
                    sqlx::query(
                        "INSERT INTO stock_levels
                             (id, store_code, item_code, item_name, size_code, size_name,
                              business_date, opening, purchase, inward, outward, closing,
                              created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, 0, 0, ?8, ?9, ?10)",
                    )
                    .bind(new_id())
                    .bind(&input.store_code)
                    .bind(&input.item_code)
                    .bind(&input.item_name)
                    .bind(&input.size_code)
                    .bind(&input.size_name)
                    .bind(input.business_date)
                    .bind(input.opening)
                    .bind(ts)
                    .bind(ts)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(inputs.len())
    }
}

// =============================================================================
// Transactional movement application
// =============================================================================

/// Applies one stock movement inside a voucher transaction.
///
/// Missing rows are created on the fly (transfer out of an untracked item
/// shows up as negative closing rather than vanishing).
pub(crate) async fn apply_movement(
    tx: &mut Transaction<'_, Sqlite>,
    store_code: &str,
    item_code: &str,
    item_name: &str,
    size_code: &str,
    size_name: &str,
    business_date: NaiveDate,
    movement: Movement,
) -> DbResult<()> {
    let existing = sqlx::query_as::<_, StockLevel>(
        "SELECT * FROM stock_levels
         WHERE store_code = ?1 AND item_code = ?2 AND size_code = ?3",
    )
    .bind(store_code)
    .bind(item_code)
    .bind(size_code)
    .fetch_optional(&mut **tx)
    .await?;

    match existing {
        Some(level) => {
            let mut cols = StockColumns {
                opening: level.opening,
                purchase: level.purchase,
                inward: level.inward,
                outward: level.outward,
                closing: level.closing,
            };
            stock::apply(&mut cols, movement);

            sqlx::query(
                "UPDATE stock_levels
                 SET purchase = ?1, inward = ?2, outward = ?3, closing = ?4,
                     business_date = ?5, updated_at = ?6
                 WHERE id = ?7",
            )
            .bind(cols.purchase)
            .bind(cols.inward)
            .bind(cols.outward)
            .bind(cols.closing)
            .bind(business_date)
            .bind(now())
            .bind(&level.id)
            .execute(&mut **tx)
            .await?;
        }
        None => {
            let mut cols = StockColumns::default();
            stock::apply(&mut cols, movement);

            let ts = now();
            sqlx::query(
                "INSERT INTO stock_levels
                     (id, store_code, item_code, item_name, size_code, size_name,
                      business_date, opening, purchase, inward, outward, closing,
                      created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?10, ?11, ?12, ?13)",
            )
            .bind(new_id())
            .bind(store_code)
            .bind(item_code)
            .bind(item_name)
            .bind(size_code)
            .bind(size_name)
            .bind(business_date)
            .bind(cols.purchase)
            .bind(cols.inward)
            .bind(cols.outward)
            .bind(cols.closing)
            .bind(ts)
            .bind(ts)
            .execute(&mut **tx)
            .await?;
        }
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

    fn opening(store: &str, item: &str, size: &str, qty: i64) -> OpeningStockInput {
        OpeningStockInput {
            store_code: store.to_string(),
            item_code: item.to_string(),
            item_name: format!("{} name", item),
            size_code: size.to_string(),
            size_name: format!("{}ml", size),
            business_date: NaiveDate::from_ymd_opt(2026, 1, 4),
            opening: qty,
        }
    }

    #[tokio::test]
    async fn test_opening_restatement_preserves_movements() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stock();

        repo.save_opening(&[opening("S001", "IT001", "750", 10)]).await.unwrap();

        // book a movement through a transaction, like a voucher would
        let mut tx = db.pool().begin().await.unwrap();
        apply_movement(
            &mut tx,
            "S001",
            "IT001",
            "IT001 name",
            "750",
            "750ml",
            NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            Movement::Outward(3),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        // stock-take corrects opening to 14; the outward of 3 must survive
        repo.save_opening(&[opening("S001", "IT001", "750", 14)]).await.unwrap();

        let level = repo.get("S001", "IT001", "750").await.unwrap().unwrap();
        assert_eq!(level.opening, 14);
        assert_eq!(level.outward, 3);
        assert_eq!(level.closing, 11);
    }

    #[tokio::test]
    async fn test_movement_creates_missing_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        apply_movement(
            &mut tx,
            "S001",
            "IT001",
            "IT001 name",
            "750",
            "750ml",
            NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            Movement::Outward(2),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let level = db.stock().get("S001", "IT001", "750").await.unwrap().unwrap();
        assert_eq!(level.closing, -2); // negative stock is visible
    }

    #[tokio::test]
    async fn test_ho_alias_fallback() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stock();

        repo.save_opening(&[opening(HEAD_OFFICE_STORE, "IT001", "750", 120)])
            .await
            .unwrap();

        assert_eq!(repo.closing_stock("HO", "IT001", "750").await.unwrap(), 120);
        let by_item = repo.closing_stock_by_item("HO", "IT001").await.unwrap();
        assert_eq!(by_item, vec![("750".to_string(), 120)]);
    }

    #[tokio::test]
    async fn test_search_available_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stock();

        repo.save_opening(&[
            opening("S001", "IT001", "750", 10),
            opening("S001", "IT002", "750", 0),
        ])
        .await
        .unwrap();

        let hits = repo.search_available_items("S001", "IT0").await.unwrap();
        // IT002 has zero closing and must not appear
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item_code, "IT001");
    }
}
