//! # Store Repository
//!
//! Store master CRUD plus the open/close trading lifecycle.
//!
//! ## Open / Close
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  closed ──open(business_date)──► open                                   │
//! │    ▲                               │                                    │
//! │    └──────────── close ────────────┘                                    │
//! │                                                                         │
//! │  Opening sets the business date and (at the caller) populates the DSR   │
//! │  for that date. Sales and transfer entry are gated on open_status.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::Store;

/// Fields accepted when creating or updating a store.
#[derive(Debug, Clone, Default)]
pub struct StoreInput {
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
}

/// Repository for stores.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Store>> {
        Ok(sqlx::query_as::<_, Store>(
            "SELECT * FROM stores ORDER BY store_name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_active(&self) -> DbResult<Vec<Store>> {
        Ok(sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE status = 1 ORDER BY store_name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_by_code(&self, store_code: &str) -> DbResult<Option<Store>> {
        Ok(
            sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE store_code = ?1")
                .bind(store_code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn exists(&self, store_code: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE store_code = ?1")
            .bind(store_code)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert(&self, input: &StoreInput) -> DbResult<Store> {
        debug!(store_code = %input.store_code, "Inserting store");
        let ts = now();
        sqlx::query(
            "INSERT INTO stores
                 (id, store_code, store_name, address, area, zone, district, city, pin,
                  phone, email, gst_number, store_type, status, open_status, business_date,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0, NULL, ?15, ?16)",
        )
        .bind(new_id())
        .bind(&input.store_code)
        .bind(&input.store_name)
        .bind(&input.address)
        .bind(&input.area)
        .bind(&input.zone)
        .bind(&input.district)
        .bind(&input.city)
        .bind(&input.pin)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.gst_number)
        .bind(&input.store_type)
        .bind(input.status)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Duplicate { .. } => DbError::duplicate("Store", &input.store_code),
            other => other,
        })?;

        self.get_by_code(&input.store_code)
            .await?
            .ok_or_else(|| DbError::not_found("Store", &input.store_code))
    }

    pub async fn update(&self, store_code: &str, input: &StoreInput) -> DbResult<Store> {
        let result = sqlx::query(
            "UPDATE stores SET store_name = ?1, address = ?2, area = ?3, zone = ?4,
                               district = ?5, city = ?6, pin = ?7, phone = ?8, email = ?9,
                               gst_number = ?10, store_type = ?11, status = ?12, updated_at = ?13
             WHERE store_code = ?14",
        )
        .bind(&input.store_name)
        .bind(&input.address)
        .bind(&input.area)
        .bind(&input.zone)
        .bind(&input.district)
        .bind(&input.city)
        .bind(&input.pin)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.gst_number)
        .bind(&input.store_type)
        .bind(input.status)
        .bind(now())
        .bind(store_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", store_code));
        }
        self.get_by_code(store_code)
            .await?
            .ok_or_else(|| DbError::not_found("Store", store_code))
    }

    /// Marks the store open for a business date.
    ///
    /// Returns the previous open state so the caller knows whether this was
    /// a genuine closed→open transition (which triggers DSR population).
    pub async fn open(&self, store_code: &str, business_date: NaiveDate) -> DbResult<bool> {
        let store = self
            .get_by_code(store_code)
            .await?
            .ok_or_else(|| DbError::not_found("Store", store_code))?;

        info!(store_code = %store_code, %business_date, "Opening store");

        sqlx::query(
            "UPDATE stores SET open_status = 1, business_date = ?1, updated_at = ?2
             WHERE store_code = ?3",
        )
        .bind(business_date)
        .bind(now())
        .bind(store_code)
        .execute(&self.pool)
        .await?;

        Ok(store.open_status)
    }

    /// Marks the store closed; the business date is kept for reporting.
    pub async fn close(&self, store_code: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE stores SET open_status = 0, updated_at = ?1 WHERE store_code = ?2",
        )
        .bind(now())
        .bind(store_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", store_code));
        }
        Ok(())
    }

    /// Soft delete: deactivates the store.
    pub async fn deactivate(&self, store_code: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE stores SET status = 0, updated_at = ?1 WHERE store_code = ?2",
        )
        .bind(now())
        .bind(store_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", store_code));
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

    fn input(code: &str, name: &str) -> StoreInput {
        StoreInput {
            store_code: code.to_string(),
            store_name: name.to_string(),
            zone: Some("North".to_string()),
            district: Some("Central".to_string()),
            status: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_open_close_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stores();

        repo.insert(&input("S001", "Main Road Wines")).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        let was_open = repo.open("S001", date).await.unwrap();
        assert!(!was_open);

        let store = repo.get_by_code("S001").await.unwrap().unwrap();
        assert!(store.open_status);
        assert_eq!(store.business_date, Some(date));

        // re-opening reports the store was already open
        assert!(repo.open("S001", date).await.unwrap());

        repo.close("S001").await.unwrap();
        let store = repo.get_by_code("S001").await.unwrap().unwrap();
        assert!(!store.open_status);
        // business date survives the close for reporting
        assert_eq!(store.business_date, Some(date));
    }

    #[tokio::test]
    async fn test_duplicate_store_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stores();

        repo.insert(&input("S001", "Main Road Wines")).await.unwrap();
        let err = repo.insert(&input("S001", "Other")).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));
    }
}
