//! # Reports Repository
//!
//! Cross-store aggregation queries behind the HO reporting screens:
//! collection & expense, and closing-stock valuation.
//!
//! Rows come back flat; the API layer folds them into the nested shapes the
//! dashboards render.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use backbar_core::LedgerKind;

/// One aggregated ledger total: district → store → ledger × kind.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CollectionExpenseRow {
    pub district: Option<String>,
    pub store_name: String,
    pub ledger_name: String,
    pub kind: LedgerKind,
    pub amount_paise: i64,
}

/// Closing stock valuation for one store × category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClosingStockRow {
    pub store_code: String,
    pub store_name: String,
    pub district: Option<String>,
    pub category_name: String,
    pub quantity: i64,
    pub amount_paise: i64,
}

/// One item × size row of the store-wise closing stock detail.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClosingStockDetailRow {
    pub category_name: String,
    pub item_code: String,
    pub item_name: String,
    pub size_code: String,
    pub size_name: String,
    pub size_sort_order: i64,
    pub quantity: i64,
    pub mrp_paise: i64,
    pub amount_paise: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: SqlitePool,
}

impl ReportsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportsRepository { pool }
    }

    /// Collection & expense totals over a date range.
    ///
    /// Empty `zone` / `district` filters match everything.
    pub async fn collection_expense(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        zone: Option<&str>,
        district: Option<&str>,
    ) -> DbResult<Vec<CollectionExpenseRow>> {
        Ok(sqlx::query_as::<_, CollectionExpenseRow>(
            "SELECT s.district AS district,
                    s.store_name AS store_name,
                    l.name AS ledger_name,
                    le.kind AS kind,
                    SUM(le.amount_paise) AS amount_paise
             FROM ledger_entries le
             JOIN stores s ON le.store_code = s.store_code
             JOIN ledgers l ON le.ledger_code = l.code
             WHERE le.invoice_date BETWEEN ?1 AND ?2
               AND (?3 = '' OR s.zone = ?3)
               AND (?4 = '' OR s.district = ?4)
             GROUP BY s.district, s.store_name, l.name, le.kind
             ORDER BY s.district, s.store_name, l.name",
        )
        .bind(start)
        .bind(end)
        .bind(zone.unwrap_or(""))
        .bind(district.unwrap_or(""))
        .fetch_all(&self.pool)
        .await?)
    }

    /// Closing stock per store × category, valued at MRP.
    ///
    /// Items without a category land under "Unknown Category"; rows with
    /// zero closing are skipped.
    pub async fn closing_stock_by_store(&self) -> DbResult<Vec<ClosingStockRow>> {
        Ok(sqlx::query_as::<_, ClosingStockRow>(
            "SELECT s.store_code AS store_code,
                    s.store_name AS store_name,
                    s.district AS district,
                    COALESCE(c.name, 'Unknown Category') AS category_name,
                    SUM(sl.closing) AS quantity,
                    SUM(sl.closing * COALESCE(pm.mrp_paise, 0)) AS amount_paise
             FROM stock_levels sl
             JOIN stores s ON sl.store_code = s.store_code
             LEFT JOIN items i ON sl.item_code = i.item_code
             LEFT JOIN categories c ON i.category_code = c.code
             LEFT JOIN price_master pm
                    ON sl.item_code = pm.item_code AND sl.size_code = pm.size_code
             WHERE sl.closing <> 0
             GROUP BY s.store_code, s.store_name, s.district, category_name
             ORDER BY s.store_name, category_name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Store-wise closing stock detail: category → item × size, valued at
    /// MRP, with size order for the column layout.
    pub async fn closing_stock_detail(
        &self,
        store_code: &str,
    ) -> DbResult<Vec<ClosingStockDetailRow>> {
        Ok(sqlx::query_as::<_, ClosingStockDetailRow>(
            "SELECT COALESCE(c.name, 'Unknown Category') AS category_name,
                    sl.item_code AS item_code,
                    sl.item_name AS item_name,
                    sl.size_code AS size_code,
                    sl.size_name AS size_name,
                    COALESCE(sz.sort_order, 0) AS size_sort_order,
                    sl.closing AS quantity,
                    COALESCE(pm.mrp_paise, 0) AS mrp_paise,
                    sl.closing * COALESCE(pm.mrp_paise, 0) AS amount_paise
             FROM stock_levels sl
             LEFT JOIN items i ON sl.item_code = i.item_code
             LEFT JOIN categories c ON i.category_code = c.code
             LEFT JOIN sizes sz ON sl.size_code = sz.code
             LEFT JOIN price_master pm
                    ON sl.item_code = pm.item_code AND sl.size_code = pm.size_code
             WHERE sl.store_code = ?1 AND sl.closing <> 0
             ORDER BY category_name, sl.item_name COLLATE NOCASE,
                      CASE WHEN COALESCE(sz.sort_order, 0) > 0
                           THEN COALESCE(sz.sort_order, 0)
                           ELSE 9223372036854775807 END,
                      sl.size_name COLLATE NOCASE",
        )
        .bind(store_code)
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
    use crate::repository::item::ItemInput;
    use crate::repository::ledger::LedgerInput;
    use crate::repository::price::PriceInput;
    use crate::repository::sale::{LedgerAllocation, SaleLineInput, SaleSaveRequest};
    use crate::repository::stock::OpeningStockInput;
    use crate::repository::store::StoreInput;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    async fn seed(db: &Database) {
        db.masters().insert_category("CAT001", "Whisky").await.unwrap();
        db.masters().insert_size("750", "750ml", 1).await.unwrap();
        db.items()
            .insert(&ItemInput {
                item_code: "IT001".into(),
                item_name: "Old Oak Whisky".into(),
                brand_code: None,
                category_code: Some("CAT001".into()),
                quality_code: None,
                status: true,
            })
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
        db.stores()
            .insert(&StoreInput {
                store_code: "S001".into(),
                store_name: "Main Road Wines".into(),
                zone: Some("North".into()),
                district: Some("Central".into()),
                status: true,
                ..Default::default()
            })
            .await
            .unwrap();
        db.stores().open("S001", date()).await.unwrap();
        db.ledgers()
            .insert(&LedgerInput {
                code: "LDG-CASH".into(),
                name: "Cash".into(),
                kind: backbar_core::LedgerKind::Tender,
                screen: Some("Sale".into()),
                sort_order: 1,
                status: true,
            })
            .await
            .unwrap();
        db.stock()
            .save_opening(&[OpeningStockInput {
                store_code: "S001".into(),
                item_code: "IT001".into(),
                item_name: "Old Oak Whisky".into(),
                size_code: "750".into(),
                size_name: "750ml".into(),
                business_date: Some(date()),
                opening: 10,
            }])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_collection_expense_groups_and_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed(&db).await;

        db.sales()
            .save(&SaleSaveRequest {
                store_code: "S001".into(),
                invoice_date: date(),
                party_code: "P001".into(),
                tender_type: Some("Cash".into()),
                user_name: None,
                items: vec![SaleLineInput {
                    item_code: "IT001".into(),
                    size_code: "750".into(),
                    mrp_paise: 52_000,
                    quantity: 2,
                }],
                other_sales: vec![],
                expenses: vec![],
                tenders: vec![LedgerAllocation {
                    ledger_code: "LDG-CASH".into(),
                    amount_paise: 104_000,
                }],
            })
            .await
            .unwrap();

        let rows = db
            .reports()
            .collection_expense(date(), date(), None, None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ledger_name, "Cash");
        assert_eq!(rows[0].kind, LedgerKind::Tender);
        assert_eq!(rows[0].amount_paise, 104_000);

        // zone filter excludes
        let rows = db
            .reports()
            .collection_expense(date(), date(), Some("South"), None)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_closing_stock_valuation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed(&db).await;

        let rows = db.reports().closing_stock_by_store().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_name, "Whisky");
        assert_eq!(rows[0].quantity, 10);
        assert_eq!(rows[0].amount_paise, 10 * 52_000);

        let detail = db.reports().closing_stock_detail("S001").await.unwrap();
        assert_eq!(detail.len(), 1);
        assert_eq!(detail[0].item_name, "Old Oak Whisky");
        assert_eq!(detail[0].mrp_paise, 52_000);
        assert_eq!(detail[0].size_sort_order, 1);
    }
}
