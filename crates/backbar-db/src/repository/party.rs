//! # Party Repository
//!
//! Vendors and customers. The purchase screen filters by party type
//! "Vendor"; sales entry defaults to the walk-in customer party.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::Party;

/// Fields accepted when creating or updating a party.
#[derive(Debug, Clone, Default)]
pub struct PartyInput {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub pin: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pan: Option<String>,
    pub gst_number: Option<String>,
    pub party_type: Option<String>,
    pub status: bool,
}

/// Repository for ledger parties.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Party>> {
        Ok(
            sqlx::query_as::<_, Party>("SELECT * FROM parties ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Lists parties of one type ("Vendor" / "Customer").
    pub async fn list_by_type(&self, party_type: &str) -> DbResult<Vec<Party>> {
        Ok(sqlx::query_as::<_, Party>(
            "SELECT * FROM parties WHERE party_type = ?1 ORDER BY name COLLATE NOCASE",
        )
        .bind(party_type)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Party>> {
        Ok(
            sqlx::query_as::<_, Party>("SELECT * FROM parties WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert(&self, input: &PartyInput) -> DbResult<Party> {
        debug!(code = %input.code, "Inserting party");
        let ts = now();
        sqlx::query(
            "INSERT INTO parties
                 (id, code, name, address, city, district, pin, phone, email, pan,
                  gst_number, party_type, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(new_id())
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.district)
        .bind(&input.pin)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.pan)
        .bind(&input.gst_number)
        .bind(&input.party_type)
        .bind(input.status)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Duplicate { .. } => DbError::duplicate("Party", &input.code),
            other => other,
        })?;

        self.get_by_code(&input.code)
            .await?
            .ok_or_else(|| DbError::not_found("Party", &input.code))
    }

    pub async fn update(&self, code: &str, input: &PartyInput) -> DbResult<Party> {
        let result = sqlx::query(
            "UPDATE parties SET name = ?1, address = ?2, city = ?3, district = ?4, pin = ?5,
                                phone = ?6, email = ?7, pan = ?8, gst_number = ?9,
                                party_type = ?10, status = ?11, updated_at = ?12
             WHERE code = ?13",
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.district)
        .bind(&input.pin)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.pan)
        .bind(&input.gst_number)
        .bind(&input.party_type)
        .bind(input.status)
        .bind(now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Party", code));
        }
        self.get_by_code(code)
            .await?
            .ok_or_else(|| DbError::not_found("Party", code))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_party_type_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.parties();

        repo.insert(&PartyInput {
            code: "P001".into(),
            name: "Cash Customer".into(),
            party_type: Some("Customer".into()),
            status: true,
            ..Default::default()
        })
        .await
        .unwrap();
        repo.insert(&PartyInput {
            code: "V001".into(),
            name: "State Beverages Corp".into(),
            party_type: Some("Vendor".into()),
            status: true,
            ..Default::default()
        })
        .await
        .unwrap();

        let vendors = repo.list_by_type("Vendor").await.unwrap();
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].code, "V001");
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }
}
