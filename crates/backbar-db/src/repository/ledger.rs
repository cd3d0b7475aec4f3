//! # Ledger Repository
//!
//! Ledger accounts offered on the entry screens. The sales screen pulls its
//! other-sale / expense / tender rows from here, ordered by `sort_order`.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::{Ledger, LedgerKind};

/// Fields accepted when creating or updating a ledger.
#[derive(Debug, Clone)]
pub struct LedgerInput {
    pub code: String,
    pub name: String,
    pub kind: LedgerKind,
    pub screen: Option<String>,
    pub sort_order: i64,
    pub status: bool,
}

/// Repository for ledger accounts.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Ledger>> {
        Ok(sqlx::query_as::<_, Ledger>(
            "SELECT * FROM ledgers
             ORDER BY CASE WHEN sort_order > 0 THEN sort_order ELSE 9223372036854775807 END,
                      name COLLATE NOCASE",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Active ledgers of one kind for one screen, in report order.
    pub async fn list_for_screen(&self, kind: LedgerKind, screen: &str) -> DbResult<Vec<Ledger>> {
        Ok(sqlx::query_as::<_, Ledger>(
            "SELECT * FROM ledgers
             WHERE kind = ?1 AND screen = ?2 AND status = 1
             ORDER BY CASE WHEN sort_order > 0 THEN sort_order ELSE 9223372036854775807 END,
                      name COLLATE NOCASE",
        )
        .bind(kind)
        .bind(screen)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Ledger>> {
        Ok(
            sqlx::query_as::<_, Ledger>("SELECT * FROM ledgers WHERE code = ?1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert(&self, input: &LedgerInput) -> DbResult<Ledger> {
        debug!(code = %input.code, "Inserting ledger");
        let ts = now();
        sqlx::query(
            "INSERT INTO ledgers (id, code, name, kind, screen, sort_order, status,
                                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(new_id())
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.kind)
        .bind(&input.screen)
        .bind(input.sort_order)
        .bind(input.status)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Duplicate { .. } => DbError::duplicate("Ledger", &input.code),
            other => other,
        })?;

        self.get_by_code(&input.code)
            .await?
            .ok_or_else(|| DbError::not_found("Ledger", &input.code))
    }

    pub async fn update(&self, code: &str, input: &LedgerInput) -> DbResult<Ledger> {
        let result = sqlx::query(
            "UPDATE ledgers SET name = ?1, kind = ?2, screen = ?3, sort_order = ?4,
                                status = ?5, updated_at = ?6
             WHERE code = ?7",
        )
        .bind(&input.name)
        .bind(input.kind)
        .bind(&input.screen)
        .bind(input.sort_order)
        .bind(input.status)
        .bind(now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ledger", code));
        }
        self.get_by_code(code)
            .await?
            .ok_or_else(|| DbError::not_found("Ledger", code))
    }

    /// Applies a full reorder from the ledger-order screen.
    pub async fn reorder(&self, codes_in_order: &[String]) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        for (idx, code) in codes_in_order.iter().enumerate() {
            sqlx::query("UPDATE ledgers SET sort_order = ?1, updated_at = ?2 WHERE code = ?3")
                .bind((idx + 1) as i64)
                .bind(now())
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
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

    fn input(code: &str, name: &str, kind: LedgerKind, order: i64) -> LedgerInput {
        LedgerInput {
            code: code.to_string(),
            name: name.to_string(),
            kind,
            screen: Some("Sale".to_string()),
            sort_order: order,
            status: true,
        }
    }

    #[tokio::test]
    async fn test_screen_filter_and_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ledgers();

        repo.insert(&input("LDG-UPI", "UPI", LedgerKind::Tender, 2))
            .await
            .unwrap();
        repo.insert(&input("LDG-CASH", "Cash", LedgerKind::Tender, 1))
            .await
            .unwrap();
        repo.insert(&input("LDG-TEA", "Staff Tea", LedgerKind::Expense, 0))
            .await
            .unwrap();

        let tenders = repo.list_for_screen(LedgerKind::Tender, "Sale").await.unwrap();
        let codes: Vec<&str> = tenders.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["LDG-CASH", "LDG-UPI"]);

        let expenses = repo.list_for_screen(LedgerKind::Expense, "Sale").await.unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].kind, LedgerKind::Expense);
    }
}
