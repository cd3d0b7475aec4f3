//! # Item Repository
//!
//! Catalog item CRUD, typeahead search and pagination for the item list
//! screen.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::Item;

/// Fields accepted when creating or updating an item.
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub item_code: String,
    pub item_name: String,
    pub brand_code: Option<String>,
    pub category_code: Option<String>,
    pub quality_code: Option<String>,
    pub status: bool,
}

/// Repository for catalog items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Paged listing with optional search over code and name.
    ///
    /// `query` is matched as a case-insensitive substring; pages are
    /// 0-based. Used by both the item list grid and the typeahead.
    pub async fn search(&self, query: &str, page: u32, page_size: u32) -> DbResult<Vec<Item>> {
        let query = query.trim();
        debug!(query = %query, page, "Searching items");

        let like = format!("%{}%", query);
        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items
             WHERE (?1 = '' OR item_code LIKE ?2 OR item_name LIKE ?2)
             ORDER BY item_name COLLATE NOCASE
             LIMIT ?3 OFFSET ?4",
        )
        .bind(query)
        .bind(like)
        .bind(page_size as i64)
        .bind((page as i64) * (page_size as i64))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Total row count for the pagination footer.
    pub async fn count(&self, query: &str) -> DbResult<i64> {
        let query = query.trim();
        let like = format!("%{}%", query);
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM items
             WHERE (?1 = '' OR item_code LIKE ?2 OR item_name LIKE ?2)",
        )
        .bind(query)
        .bind(like)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Lists active items only (voucher entry screens).
    pub async fn list_active(&self) -> DbResult<Vec<Item>> {
        Ok(sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE status = 1 ORDER BY item_name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_by_code(&self, item_code: &str) -> DbResult<Option<Item>> {
        Ok(
            sqlx::query_as::<_, Item>("SELECT * FROM items WHERE item_code = ?1")
                .bind(item_code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert(&self, input: &ItemInput) -> DbResult<Item> {
        debug!(item_code = %input.item_code, "Inserting item");
        let ts = now();
        sqlx::query(
            "INSERT INTO items
                 (id, item_code, item_name, brand_code, category_code, quality_code,
                  status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(new_id())
        .bind(&input.item_code)
        .bind(&input.item_name)
        .bind(&input.brand_code)
        .bind(&input.category_code)
        .bind(&input.quality_code)
        .bind(input.status)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Duplicate { .. } => DbError::duplicate("Item", &input.item_code),
            other => other,
        })?;

        self.get_by_code(&input.item_code)
            .await?
            .ok_or_else(|| DbError::not_found("Item", &input.item_code))
    }

    pub async fn update(&self, item_code: &str, input: &ItemInput) -> DbResult<Item> {
        let result = sqlx::query(
            "UPDATE items SET item_name = ?1, brand_code = ?2, category_code = ?3,
                              quality_code = ?4, status = ?5, updated_at = ?6
             WHERE item_code = ?7",
        )
        .bind(&input.item_name)
        .bind(&input.brand_code)
        .bind(&input.category_code)
        .bind(&input.quality_code)
        .bind(input.status)
        .bind(now())
        .bind(item_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", item_code));
        }
        self.get_by_code(item_code)
            .await?
            .ok_or_else(|| DbError::not_found("Item", item_code))
    }

    /// Soft delete: flips status off.
    pub async fn deactivate(&self, item_code: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE items SET status = 0, updated_at = ?1 WHERE item_code = ?2",
        )
        .bind(now())
        .bind(item_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", item_code));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn input(code: &str, name: &str) -> ItemInput {
        ItemInput {
            item_code: code.to_string(),
            item_name: name.to_string(),
            brand_code: Some("BR001".to_string()),
            category_code: Some("CAT001".to_string()),
            quality_code: None,
            status: true,
        }
    }

    #[tokio::test]
    async fn test_item_search_and_pagination() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        repo.insert(&input("IT001", "Old Oak Whisky")).await.unwrap();
        repo.insert(&input("IT002", "Old Oak Reserve")).await.unwrap();
        repo.insert(&input("IT003", "Golden Lager")).await.unwrap();

        let hits = repo.search("old oak", 0, 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(repo.count("old oak").await.unwrap(), 2);

        // page size 1, second page
        let page2 = repo.search("old oak", 1, 1).await.unwrap();
        assert_eq!(page2.len(), 1);

        // empty query returns everything
        assert_eq!(repo.search("", 0, 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_item_update_and_deactivate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        repo.insert(&input("IT001", "Old Oak Whisky")).await.unwrap();

        let mut changed = input("IT001", "Old Oak Whisky 12y");
        changed.category_code = Some("CAT002".to_string());
        let updated = repo.update("IT001", &changed).await.unwrap();
        assert_eq!(updated.item_name, "Old Oak Whisky 12y");
        assert_eq!(updated.category_code.as_deref(), Some("CAT002"));

        repo.deactivate("IT001").await.unwrap();
        assert!(repo.list_active().await.unwrap().is_empty());

        assert!(matches!(
            repo.update("IT999", &changed).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
