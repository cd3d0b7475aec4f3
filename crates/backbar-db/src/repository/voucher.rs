//! # Voucher Numbering Repository
//!
//! Numbering rules, atomic sequence allocation and the issued-number log.
//!
//! ## Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  allocate_number(tx, SALE, "S001", 2026-01-04)                          │
//! │       │                                                                 │
//! │       ├── load active rule for SALE                                     │
//! │       │     └── none? legacy fallback: max(number)+1 from the voucher   │
//! │       │         table itself                                            │
//! │       │                                                                 │
//! │       ├── UPSERT voucher_sequences ... current_number + 1 RETURNING     │
//! │       │   (single statement - no read-modify-write race)                │
//! │       │                                                                 │
//! │       ├── render via backbar_core::voucher::format_voucher_number       │
//! │       └── append to voucher_number_log                                  │
//! │                                                                         │
//! │  Runs inside the voucher's own transaction: an aborted save never       │
//! │  burns a number.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entry screens show a *provisional* number ([`VoucherRepository::preview`]);
//! the save path always re-allocates, so two terminals previewing the same
//! number still commit distinct vouchers.

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::voucher::{format_voucher_number, reset_key, sequence_store_key};
use backbar_core::{NumberingScope, ResetFrequency, VoucherRule, VoucherType};

/// Fields accepted when saving a numbering rule.
#[derive(Debug, Clone)]
pub struct VoucherRuleInput {
    pub voucher_type: VoucherType,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub include_store_code: bool,
    pub store_code_position: i64,
    pub include_year: bool,
    pub year_format: Option<String>,
    pub include_month: bool,
    pub month_format: Option<String>,
    pub include_day: bool,
    pub day_format: Option<String>,
    pub separator: String,
    pub number_padding: i64,
    pub reset_frequency: ResetFrequency,
    pub numbering_scope: NumberingScope,
    pub is_active: bool,
}

/// Repository for voucher numbering.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    pool: SqlitePool,
}

impl VoucherRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VoucherRepository { pool }
    }

    // =========================================================================
    // Rules
    // =========================================================================

    pub async fn get_rule(&self, voucher_type: VoucherType) -> DbResult<Option<VoucherRule>> {
        Ok(sqlx::query_as::<_, VoucherRule>(
            "SELECT * FROM voucher_rules WHERE voucher_type = ?1",
        )
        .bind(voucher_type)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Creates or replaces the rule for a voucher type.
    pub async fn save_rule(&self, input: &VoucherRuleInput) -> DbResult<VoucherRule> {
        debug!(voucher_type = input.voucher_type.as_str(), "Saving voucher rule");
        let ts = now();
        sqlx::query(
            "INSERT INTO voucher_rules
                 (id, voucher_type, prefix, suffix, include_store_code, store_code_position,
                  include_year, year_format, include_month, month_format, include_day,
                  day_format, separator, number_padding, reset_frequency, numbering_scope,
                  is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
             ON CONFLICT (voucher_type) DO UPDATE SET
                 prefix = excluded.prefix,
                 suffix = excluded.suffix,
                 include_store_code = excluded.include_store_code,
                 store_code_position = excluded.store_code_position,
                 include_year = excluded.include_year,
                 year_format = excluded.year_format,
                 include_month = excluded.include_month,
                 month_format = excluded.month_format,
                 include_day = excluded.include_day,
                 day_format = excluded.day_format,
                 separator = excluded.separator,
                 number_padding = excluded.number_padding,
                 reset_frequency = excluded.reset_frequency,
                 numbering_scope = excluded.numbering_scope,
                 is_active = excluded.is_active,
                 updated_at = excluded.updated_at",
        )
        .bind(new_id())
        .bind(input.voucher_type)
        .bind(&input.prefix)
        .bind(&input.suffix)
        .bind(input.include_store_code)
        .bind(input.store_code_position)
        .bind(input.include_year)
        .bind(&input.year_format)
        .bind(input.include_month)
        .bind(&input.month_format)
        .bind(input.include_day)
        .bind(&input.day_format)
        .bind(&input.separator)
        .bind(input.number_padding)
        .bind(input.reset_frequency)
        .bind(input.numbering_scope)
        .bind(input.is_active)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await?;

        self.get_rule(input.voucher_type)
            .await?
            .ok_or_else(|| DbError::not_found("VoucherRule", input.voucher_type.as_str()))
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Renders the next number without consuming the sequence.
    ///
    /// Provisional only: the save path re-allocates.
    pub async fn preview(
        &self,
        voucher_type: VoucherType,
        store_code: Option<&str>,
        date: NaiveDate,
    ) -> DbResult<String> {
        let rule = self.active_rule(voucher_type).await?;

        let Some(rule) = rule else {
            let next = self.legacy_next_number(voucher_type).await?;
            return Ok(next.to_string());
        };

        let store_key = sequence_store_key(rule.numbering_scope, store_code)?;
        let key = reset_key(rule.reset_frequency, date);

        let current: Option<i64> = sqlx::query_scalar(
            "SELECT current_number FROM voucher_sequences
             WHERE voucher_type = ?1 AND store_code = ?2 AND reset_key = ?3",
        )
        .bind(voucher_type)
        .bind(&store_key)
        .bind(&key)
        .fetch_optional(&self.pool)
        .await?;

        let next = current.unwrap_or(0) + 1;
        Ok(format_voucher_number(&rule, store_code, date, next as u32))
    }

    async fn active_rule(&self, voucher_type: VoucherType) -> DbResult<Option<VoucherRule>> {
        Ok(sqlx::query_as::<_, VoucherRule>(
            "SELECT * FROM voucher_rules WHERE voucher_type = ?1 AND is_active = 1",
        )
        .bind(voucher_type)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Legacy numbering: highest numeric voucher number in the series + 1.
    /// Used when no rule is configured, so a fresh install still issues
    /// 1, 2, 3, ...
    async fn legacy_next_number(&self, voucher_type: VoucherType) -> DbResult<i64> {
        let sql = legacy_max_sql(voucher_type);
        let max: i64 = sqlx::query_scalar(sql).fetch_one(&self.pool).await?;
        Ok(max + 1)
    }
}

fn legacy_max_sql(voucher_type: VoucherType) -> &'static str {
    match voucher_type {
        VoucherType::Sale => {
            "SELECT COALESCE(MAX(CAST(invoice_no AS INTEGER)), 0) FROM sale_vouchers"
        }
        VoucherType::Purchase => {
            "SELECT COALESCE(MAX(CAST(invoice_no AS INTEGER)), 0) FROM purchase_vouchers"
        }
        VoucherType::StockTransferOut => {
            "SELECT COALESCE(MAX(CAST(sto_number AS INTEGER)), 0) FROM transfer_out"
        }
        VoucherType::StockTransferIn => {
            "SELECT COALESCE(MAX(CAST(sti_number AS INTEGER)), 0) FROM transfer_in"
        }
    }
}

// =============================================================================
// Transactional allocation
// =============================================================================

/// Allocates and logs the next voucher number inside a voucher transaction.
pub(crate) async fn allocate_number(
    tx: &mut Transaction<'_, Sqlite>,
    voucher_type: VoucherType,
    store_code: Option<&str>,
    date: NaiveDate,
) -> DbResult<String> {
    let rule = sqlx::query_as::<_, VoucherRule>(
        "SELECT * FROM voucher_rules WHERE voucher_type = ?1 AND is_active = 1",
    )
    .bind(voucher_type)
    .fetch_optional(&mut **tx)
    .await?;

    let Some(rule) = rule else {
        // No configuration: plain incrementing series per voucher table.
        let max: i64 = sqlx::query_scalar(legacy_max_sql(voucher_type))
            .fetch_one(&mut **tx)
            .await?;
        return Ok((max + 1).to_string());
    };

    let store_key = sequence_store_key(rule.numbering_scope, store_code)?;
    let key = reset_key(rule.reset_frequency, date);

    // Single-statement increment: concurrent savers serialize on the row.
    let next: i64 = sqlx::query_scalar(
        "INSERT INTO voucher_sequences
             (id, voucher_type, store_code, reset_key, current_number, last_generated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5)
         ON CONFLICT (voucher_type, store_code, reset_key) DO UPDATE SET
             current_number = current_number + 1,
             last_generated_at = excluded.last_generated_at
         RETURNING current_number",
    )
    .bind(new_id())
    .bind(voucher_type)
    .bind(&store_key)
    .bind(&key)
    .bind(now())
    .fetch_one(&mut **tx)
    .await?;

    let number = format_voucher_number(&rule, store_code, date, next as u32);

    sqlx::query(
        "INSERT INTO voucher_number_log (id, voucher_type, store_code, voucher_number, generated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(new_id())
    .bind(voucher_type)
    .bind(store_code)
    .bind(&number)
    .bind(now())
    .execute(&mut **tx)
    .await?;

    debug!(voucher_type = voucher_type.as_str(), number = %number, "Allocated voucher number");
    Ok(number)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn rule_input(scope: NumberingScope, freq: ResetFrequency) -> VoucherRuleInput {
        VoucherRuleInput {
            voucher_type: VoucherType::Sale,
            prefix: Some("SAL".into()),
            suffix: None,
            include_store_code: true,
            store_code_position: 1,
            include_year: true,
            year_format: Some("YYYY".into()),
            include_month: false,
            month_format: None,
            include_day: false,
            day_format: None,
            separator: "-".into(),
            number_padding: 4,
            reset_frequency: freq,
            numbering_scope: scope,
            is_active: true,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    async fn allocate(db: &Database, store: Option<&str>) -> DbResult<String> {
        let mut tx = db.pool().begin().await?;
        let n = allocate_number(&mut tx, VoucherType::Sale, store, date()).await?;
        tx.commit().await?;
        Ok(n)
    }

    #[tokio::test]
    async fn test_store_wise_sequences_are_independent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.vouchers()
            .save_rule(&rule_input(NumberingScope::StoreWise, ResetFrequency::Yearly))
            .await
            .unwrap();

        assert_eq!(allocate(&db, Some("S001")).await.unwrap(), "SAL-S001-2026-0001");
        assert_eq!(allocate(&db, Some("S001")).await.unwrap(), "SAL-S001-2026-0002");
        assert_eq!(allocate(&db, Some("S002")).await.unwrap(), "SAL-S002-2026-0001");
    }

    #[tokio::test]
    async fn test_global_scope_shares_one_sequence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.vouchers()
            .save_rule(&rule_input(NumberingScope::Global, ResetFrequency::Never))
            .await
            .unwrap();

        assert_eq!(allocate(&db, Some("S001")).await.unwrap(), "SAL-S001-2026-0001");
        assert_eq!(allocate(&db, Some("S002")).await.unwrap(), "SAL-S002-2026-0002");
    }

    #[tokio::test]
    async fn test_store_wise_requires_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.vouchers()
            .save_rule(&rule_input(NumberingScope::StoreWise, ResetFrequency::Never))
            .await
            .unwrap();

        assert!(allocate(&db, None).await.is_err());
    }

    #[tokio::test]
    async fn test_preview_does_not_consume() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.vouchers()
            .save_rule(&rule_input(NumberingScope::StoreWise, ResetFrequency::Yearly))
            .await
            .unwrap();

        let p1 = db.vouchers().preview(VoucherType::Sale, Some("S001"), date()).await.unwrap();
        let p2 = db.vouchers().preview(VoucherType::Sale, Some("S001"), date()).await.unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1, "SAL-S001-2026-0001");

        // the save path allocates what the preview promised
        assert_eq!(allocate(&db, Some("S001")).await.unwrap(), p1);
        let p3 = db.vouchers().preview(VoucherType::Sale, Some("S001"), date()).await.unwrap();
        assert_eq!(p3, "SAL-S001-2026-0002");
    }

    #[tokio::test]
    async fn test_legacy_fallback_without_rule() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // no rule saved
        assert_eq!(allocate(&db, Some("S001")).await.unwrap(), "1");
        assert_eq!(
            db.vouchers().preview(VoucherType::Sale, Some("S001"), date()).await.unwrap(),
            "1"
        );
    }

    #[tokio::test]
    async fn test_rollback_does_not_burn_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.vouchers()
            .save_rule(&rule_input(NumberingScope::Global, ResetFrequency::Never))
            .await
            .unwrap();

        {
            let mut tx = db.pool().begin().await.unwrap();
            let n = allocate_number(&mut tx, VoucherType::Sale, Some("S001"), date())
                .await
                .unwrap();
            assert!(n.ends_with("0001"));
            tx.rollback().await.unwrap();
        }

        // the aborted save's number is reissued
        assert_eq!(allocate(&db, Some("S001")).await.unwrap(), "SAL-S001-2026-0001");
    }
}
