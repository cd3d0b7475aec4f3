//! # Price Repository
//!
//! The item × size price grid: purchase price and MRP per pack size.
//! The Excel import path funnels through [`PriceRepository::upsert`] so a
//! re-imported sheet simply restates prices.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{new_id, now};
use backbar_core::PriceEntry;

/// One price row to upsert (API batch save and Excel import).
#[derive(Debug, Clone)]
pub struct PriceInput {
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub purchase_price_paise: i64,
    pub mrp_paise: i64,
}

/// Repository for the price master.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    pool: SqlitePool,
}

impl PriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PriceRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<PriceEntry>> {
        Ok(sqlx::query_as::<_, PriceEntry>(
            "SELECT * FROM price_master ORDER BY item_name COLLATE NOCASE, size_name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_for_item(&self, item_code: &str) -> DbResult<Vec<PriceEntry>> {
        Ok(sqlx::query_as::<_, PriceEntry>(
            "SELECT * FROM price_master WHERE item_code = ?1 ORDER BY size_name COLLATE NOCASE",
        )
        .bind(item_code)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get(&self, item_code: &str, size_code: &str) -> DbResult<Option<PriceEntry>> {
        Ok(sqlx::query_as::<_, PriceEntry>(
            "SELECT * FROM price_master WHERE item_code = ?1 AND size_code = ?2",
        )
        .bind(item_code)
        .bind(size_code)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Inserts or restates one price row, keyed on item_code + size_code.
    pub async fn upsert(&self, input: &PriceInput) -> DbResult<()> {
        debug!(item_code = %input.item_code, size_code = %input.size_code, "Upserting price");
        let ts = now();
        sqlx::query(
            "INSERT INTO price_master
                 (id, item_code, item_name, size_code, size_name,
                  purchase_price_paise, mrp_paise, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT (item_code, size_code) DO UPDATE SET
                 item_name = excluded.item_name,
                 size_name = excluded.size_name,
                 purchase_price_paise = excluded.purchase_price_paise,
                 mrp_paise = excluded.mrp_paise,
                 updated_at = excluded.updated_at",
        )
        .bind(new_id())
        .bind(&input.item_code)
        .bind(&input.item_name)
        .bind(&input.size_code)
        .bind(&input.size_name)
        .bind(input.purchase_price_paise)
        .bind(input.mrp_paise)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upserts a batch inside one transaction; all-or-nothing.
    pub async fn upsert_batch(&self, inputs: &[PriceInput]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        let ts = now();
        for input in inputs {
            sqlx::query(
                "INSERT INTO price_master
                     (id, item_code, item_name, size_code, size_name,
                      purchase_price_paise, mrp_paise, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT (item_code, size_code) DO UPDATE SET
                     item_name = excluded.item_name,
                     size_name = excluded.size_name,
                     purchase_price_paise = excluded.purchase_price_paise,
                     mrp_paise = excluded.mrp_paise,
                     updated_at = excluded.updated_at",
            )
            .bind(new_id())
            .bind(&input.item_code)
            .bind(&input.item_name)
            .bind(&input.size_code)
            .bind(&input.size_name)
            .bind(input.purchase_price_paise)
            .bind(input.mrp_paise)
            .bind(ts)
            .bind(ts)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(inputs.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn price(item: &str, size: &str, purchase: i64, mrp: i64) -> PriceInput {
        PriceInput {
            item_code: item.to_string(),
            item_name: format!("{} name", item),
            size_code: size.to_string(),
            size_name: format!("{}ml", size),
            purchase_price_paise: purchase,
            mrp_paise: mrp,
        }
    }

    #[tokio::test]
    async fn test_upsert_restates_price() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.prices();

        repo.upsert(&price("IT001", "750", 40_000, 52_000)).await.unwrap();
        repo.upsert(&price("IT001", "750", 41_000, 54_000)).await.unwrap();

        let entry = repo.get("IT001", "750").await.unwrap().unwrap();
        assert_eq!(entry.purchase_price_paise, 41_000);
        assert_eq!(entry.mrp_paise, 54_000);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_batch_upsert() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.prices();

        let rows = vec![
            price("IT001", "750", 40_000, 52_000),
            price("IT001", "375", 20_000, 26_000),
            price("IT002", "750", 30_000, 36_000),
        ];
        assert_eq!(repo.upsert_batch(&rows).await.unwrap(), 3);
        assert_eq!(repo.list_for_item("IT001").await.unwrap().len(), 2);
    }
}
