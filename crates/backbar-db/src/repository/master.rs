//! # Master Data Repository
//!
//! CRUD for the four simple code/name catalogs: brands, categories, sizes
//! and qualities. These tables are shaped identically except that sizes
//! carry a `sort_order` used for DSR column ordering.
//!
//! All deletes are soft: the modal screens flip `status` instead of removing
//! rows that vouchers may reference.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::{Brand, Category, Quality, Size};

/// Repository for the simple master catalogs.
#[derive(Debug, Clone)]
pub struct MasterRepository {
    pool: SqlitePool,
}

impl MasterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MasterRepository { pool }
    }

    // =========================================================================
    // Brands
    // =========================================================================

    /// Lists brands; `active_only` restricts to status = 1.
    pub async fn list_brands(&self, active_only: bool) -> DbResult<Vec<Brand>> {
        let sql = if active_only {
            "SELECT * FROM brands WHERE status = 1 ORDER BY name COLLATE NOCASE"
        } else {
            "SELECT * FROM brands ORDER BY name COLLATE NOCASE"
        };
        Ok(sqlx::query_as::<_, Brand>(sql).fetch_all(&self.pool).await?)
    }

    pub async fn get_brand(&self, code: &str) -> DbResult<Option<Brand>> {
        Ok(
            sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert_brand(&self, code: &str, name: &str) -> DbResult<Brand> {
        debug!(code = %code, "Inserting brand");
        let ts = now();
        sqlx::query(
            "INSERT INTO brands (id, code, name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5)",
        )
        .bind(new_id())
        .bind(code)
        .bind(name)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, "Brand", code))?;

        self.get_brand(code)
            .await?
            .ok_or_else(|| DbError::not_found("Brand", code))
    }

    pub async fn update_brand(&self, code: &str, name: &str, status: bool) -> DbResult<Brand> {
        let result = sqlx::query(
            "UPDATE brands SET name = ?1, status = ?2, updated_at = ?3 WHERE code = ?4",
        )
        .bind(name)
        .bind(status)
        .bind(now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Brand", code));
        }
        self.get_brand(code)
            .await?
            .ok_or_else(|| DbError::not_found("Brand", code))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self, active_only: bool) -> DbResult<Vec<Category>> {
        let sql = if active_only {
            "SELECT * FROM categories WHERE status = 1 ORDER BY name COLLATE NOCASE"
        } else {
            "SELECT * FROM categories ORDER BY name COLLATE NOCASE"
        };
        Ok(sqlx::query_as::<_, Category>(sql)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_category(&self, code: &str) -> DbResult<Option<Category>> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert_category(&self, code: &str, name: &str) -> DbResult<Category> {
        debug!(code = %code, "Inserting category");
        let ts = now();
        sqlx::query(
            "INSERT INTO categories (id, code, name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5)",
        )
        .bind(new_id())
        .bind(code)
        .bind(name)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, "Category", code))?;

        self.get_category(code)
            .await?
            .ok_or_else(|| DbError::not_found("Category", code))
    }

    pub async fn update_category(&self, code: &str, name: &str, status: bool) -> DbResult<Category> {
        let result = sqlx::query(
            "UPDATE categories SET name = ?1, status = ?2, updated_at = ?3 WHERE code = ?4",
        )
        .bind(name)
        .bind(status)
        .bind(now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", code));
        }
        self.get_category(code)
            .await?
            .ok_or_else(|| DbError::not_found("Category", code))
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    /// Lists sizes in report order (explicit sort_order first, then name).
    pub async fn list_sizes(&self, active_only: bool) -> DbResult<Vec<Size>> {
        let sql = if active_only {
            "SELECT * FROM sizes WHERE status = 1
             ORDER BY CASE WHEN sort_order > 0 THEN sort_order ELSE 9223372036854775807 END,
                      name COLLATE NOCASE"
        } else {
            "SELECT * FROM sizes
             ORDER BY CASE WHEN sort_order > 0 THEN sort_order ELSE 9223372036854775807 END,
                      name COLLATE NOCASE"
        };
        Ok(sqlx::query_as::<_, Size>(sql).fetch_all(&self.pool).await?)
    }

    pub async fn get_size(&self, code: &str) -> DbResult<Option<Size>> {
        Ok(
            sqlx::query_as::<_, Size>("SELECT * FROM sizes WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert_size(&self, code: &str, name: &str, sort_order: i64) -> DbResult<Size> {
        debug!(code = %code, "Inserting size");
        let ts = now();
        sqlx::query(
            "INSERT INTO sizes (id, code, name, sort_order, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
        )
        .bind(new_id())
        .bind(code)
        .bind(name)
        .bind(sort_order)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, "Size", code))?;

        self.get_size(code)
            .await?
            .ok_or_else(|| DbError::not_found("Size", code))
    }

    pub async fn update_size(
        &self,
        code: &str,
        name: &str,
        sort_order: i64,
        status: bool,
    ) -> DbResult<Size> {
        let result = sqlx::query(
            "UPDATE sizes SET name = ?1, sort_order = ?2, status = ?3, updated_at = ?4
             WHERE code = ?5",
        )
        .bind(name)
        .bind(sort_order)
        .bind(status)
        .bind(now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Size", code));
        }
        self.get_size(code)
            .await?
            .ok_or_else(|| DbError::not_found("Size", code))
    }

    /// Applies a full reorder from the size-order screen: position in the
    /// slice becomes `sort_order` (1-based).
    pub async fn reorder_sizes(&self, codes_in_order: &[String]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        for (idx, code) in codes_in_order.iter().enumerate() {
            sqlx::query("UPDATE sizes SET sort_order = ?1, updated_at = ?2 WHERE code = ?3")
                .bind((idx + 1) as i64)
                .bind(now())
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // Qualities
    // =========================================================================

    pub async fn list_qualities(&self, active_only: bool) -> DbResult<Vec<Quality>> {
        let sql = if active_only {
            "SELECT * FROM qualities WHERE status = 1 ORDER BY name COLLATE NOCASE"
        } else {
            "SELECT * FROM qualities ORDER BY name COLLATE NOCASE"
        };
        Ok(sqlx::query_as::<_, Quality>(sql)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn get_quality(&self, code: &str) -> DbResult<Option<Quality>> {
        Ok(
            sqlx::query_as::<_, Quality>("SELECT * FROM qualities WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert_quality(&self, code: &str, name: &str) -> DbResult<Quality> {
        debug!(code = %code, "Inserting quality");
        let ts = now();
        sqlx::query(
            "INSERT INTO qualities (id, code, name, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, 1, ?4, ?5)",
        )
        .bind(new_id())
        .bind(code)
        .bind(name)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, "Quality", code))?;

        self.get_quality(code)
            .await?
            .ok_or_else(|| DbError::not_found("Quality", code))
    }

    pub async fn update_quality(&self, code: &str, name: &str, status: bool) -> DbResult<Quality> {
        let result = sqlx::query(
            "UPDATE qualities SET name = ?1, status = ?2, updated_at = ?3 WHERE code = ?4",
        )
        .bind(name)
        .bind(status)
        .bind(now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quality", code));
        }
        self.get_quality(code)
            .await?
            .ok_or_else(|| DbError::not_found("Quality", code))
    }
}

/// Rewrites a raw UNIQUE violation into a Duplicate error with entity context.
fn map_duplicate(err: sqlx::Error, entity: &str, value: &str) -> DbError {
    match DbError::from(err) {
        DbError::Duplicate { .. } => DbError::duplicate(entity, value),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_brand_crud() {
        let db = test_db().await;
        let repo = db.masters();

        let brand = repo.insert_brand("BR001", "Old Oak").await.unwrap();
        assert_eq!(brand.code, "BR001");
        assert!(brand.status);

        let updated = repo.update_brand("BR001", "Old Oak Distillers", false).await.unwrap();
        assert_eq!(updated.name, "Old Oak Distillers");
        assert!(!updated.status);

        assert!(repo.list_brands(true).await.unwrap().is_empty());
        assert_eq!(repo.list_brands(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_brand_code_rejected() {
        let db = test_db().await;
        let repo = db.masters();

        repo.insert_brand("BR001", "Old Oak").await.unwrap();
        let err = repo.insert_brand("BR001", "Another").await.unwrap_err();
        assert_eq!(err.to_string(), "Brand 'BR001' already exists");
    }

    #[tokio::test]
    async fn test_size_ordering() {
        let db = test_db().await;
        let repo = db.masters();

        repo.insert_size("SZ180", "180ml", 0).await.unwrap();
        repo.insert_size("SZ750", "750ml", 1).await.unwrap();
        repo.insert_size("SZ375", "375ml", 2).await.unwrap();

        let sizes = repo.list_sizes(true).await.unwrap();
        let codes: Vec<&str> = sizes.iter().map(|s| s.code.as_str()).collect();
        // explicit order first, unordered rows alphabetical after
        assert_eq!(codes, vec!["SZ750", "SZ375", "SZ180"]);

        repo.reorder_sizes(&["SZ180".into(), "SZ375".into(), "SZ750".into()])
            .await
            .unwrap();
        let sizes = repo.list_sizes(true).await.unwrap();
        let codes: Vec<&str> = sizes.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["SZ180", "SZ375", "SZ750"]);
    }
}
