//! # Voucher Numbering
//!
//! Pure formatting for the configurable voucher-number engine.
//!
//! ## Anatomy of a Voucher Number
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   SAL - S001 - 2026 - 01 - 0042                                         │
//! │    │     │      │     │     │                                           │
//! │  prefix  │    year  month  padded sequence number                       │
//! │        store code (position 1/2/3 per rule)                             │
//! │                                                                         │
//! │  Segment presence, formats, separator and padding all come from the     │
//! │  per-series VoucherRule. Sequence allocation (and its reset key) is     │
//! │  the db layer's job; this module only renders.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};

use crate::error::{CoreError, CoreResult};
use crate::types::{NumberingScope, ResetFrequency, VoucherRule};

// =============================================================================
// Reset Keys
// =============================================================================

/// Derives the sequence reset key for a business date.
///
/// Sequences are stored per `(voucher_type, store, reset_key)`; changing the
/// key is what restarts numbering at the configured frequency.
///
/// ## Example
/// ```rust
/// use backbar_core::types::ResetFrequency;
/// use backbar_core::voucher::reset_key;
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
/// assert_eq!(reset_key(ResetFrequency::Never, d), "GLOBAL");
/// assert_eq!(reset_key(ResetFrequency::Daily, d), "2026-01-04");
/// assert_eq!(reset_key(ResetFrequency::Monthly, d), "2026-01");
/// assert_eq!(reset_key(ResetFrequency::Yearly, d), "2026");
/// ```
pub fn reset_key(frequency: ResetFrequency, date: NaiveDate) -> String {
    match frequency {
        ResetFrequency::Never => "GLOBAL".to_string(),
        ResetFrequency::Daily => date.format("%Y-%m-%d").to_string(),
        ResetFrequency::Monthly => format!("{}-{:02}", date.year(), date.month()),
        ResetFrequency::Yearly => date.year().to_string(),
    }
}

/// Sequence-row store key: STORE_WISE keeps one row per store, GLOBAL shares
/// a single row (empty-string key, so the unique index behaves).
pub fn sequence_store_key(scope: NumberingScope, store_code: Option<&str>) -> CoreResult<String> {
    match scope {
        NumberingScope::Global => Ok(String::new()),
        NumberingScope::StoreWise => match store_code {
            Some(code) if !code.trim().is_empty() => Ok(code.trim().to_string()),
            _ => Err(CoreError::StoreRequiredForNumbering),
        },
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Renders a voucher number from its rule, store, date and sequence number.
///
/// Segment order: prefix, [store@1], year, [store@2], month, day, [store@3],
/// padded number, suffix - joined by the rule's separator.
pub fn format_voucher_number(
    rule: &VoucherRule,
    store_code: Option<&str>,
    date: NaiveDate,
    number: u32,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut store_added = false;
    let store = store_code.unwrap_or_default();

    if let Some(prefix) = rule.prefix.as_deref() {
        if !prefix.is_empty() {
            parts.push(prefix.to_string());
        }
    }

    // Position 1: after prefix (the default)
    if rule.include_store_code && rule.store_code_position <= 1 && !store.is_empty() {
        parts.push(store.to_string());
        store_added = true;
    }

    if rule.include_year {
        let year = date.year();
        match rule.year_format.as_deref() {
            Some("YY") => parts.push(format!("{:02}", year % 100)),
            _ => parts.push(year.to_string()),
        }
    }

    // Position 2: after year
    if rule.include_store_code && !store_added && rule.store_code_position == 2 && !store.is_empty()
    {
        parts.push(store.to_string());
        store_added = true;
    }

    if rule.include_month {
        match rule.month_format.as_deref() {
            Some("M") => parts.push(date.month().to_string()),
            _ => parts.push(format!("{:02}", date.month())),
        }
    }

    if rule.include_day {
        match rule.day_format.as_deref() {
            Some("D") => parts.push(date.day().to_string()),
            _ => parts.push(format!("{:02}", date.day())),
        }
    }

    // Position 3: before number
    if rule.include_store_code && !store_added && rule.store_code_position == 3 && !store.is_empty()
    {
        parts.push(store.to_string());
    }

    let padding = rule.number_padding.clamp(1, 12) as usize;
    parts.push(format!("{:0width$}", number, width = padding));

    if let Some(suffix) = rule.suffix.as_deref() {
        if !suffix.is_empty() {
            parts.push(suffix.to_string());
        }
    }

    parts.join(&rule.separator)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoucherType;
    use chrono::Utc;

    fn rule() -> VoucherRule {
        VoucherRule {
            id: String::new(),
            voucher_type: VoucherType::Sale,
            prefix: Some("SAL".into()),
            suffix: None,
            include_store_code: true,
            store_code_position: 1,
            include_year: true,
            year_format: Some("YYYY".into()),
            include_month: true,
            month_format: Some("MM".into()),
            include_day: false,
            day_format: None,
            separator: "-".into(),
            number_padding: 4,
            reset_frequency: ResetFrequency::Monthly,
            numbering_scope: NumberingScope::StoreWise,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let n = format_voucher_number(&rule(), Some("S001"), date(), 42);
        assert_eq!(n, "SAL-S001-2026-01-0042");
    }

    #[test]
    fn test_store_code_positions() {
        let mut r = rule();
        r.store_code_position = 2;
        assert_eq!(
            format_voucher_number(&r, Some("S001"), date(), 7),
            "SAL-2026-S001-01-0007"
        );

        r.store_code_position = 3;
        assert_eq!(
            format_voucher_number(&r, Some("S001"), date(), 7),
            "SAL-2026-01-S001-0007"
        );
    }

    #[test]
    fn test_short_year_and_suffix() {
        let mut r = rule();
        r.year_format = Some("YY".into());
        r.include_month = false;
        r.suffix = Some("A".into());
        assert_eq!(
            format_voucher_number(&r, Some("S001"), date(), 1),
            "SAL-S001-26-0001-A"
        );
    }

    #[test]
    fn test_unpadded_month_day() {
        let mut r = rule();
        r.month_format = Some("M".into());
        r.include_day = true;
        r.day_format = Some("D".into());
        assert_eq!(
            format_voucher_number(&r, Some("S001"), date(), 1),
            "SAL-S001-2026-1-4-0001"
        );
    }

    #[test]
    fn test_no_store_segment_without_code() {
        let n = format_voucher_number(&rule(), None, date(), 3);
        assert_eq!(n, "SAL-2026-01-0003");
    }

    #[test]
    fn test_reset_keys() {
        assert_eq!(reset_key(ResetFrequency::Never, date()), "GLOBAL");
        assert_eq!(reset_key(ResetFrequency::Daily, date()), "2026-01-04");
        assert_eq!(reset_key(ResetFrequency::Monthly, date()), "2026-01");
        assert_eq!(reset_key(ResetFrequency::Yearly, date()), "2026");
    }

    #[test]
    fn test_sequence_store_key() {
        assert_eq!(
            sequence_store_key(NumberingScope::Global, Some("S001")).unwrap(),
            ""
        );
        assert_eq!(
            sequence_store_key(NumberingScope::StoreWise, Some("S001")).unwrap(),
            "S001"
        );
        assert!(sequence_store_key(NumberingScope::StoreWise, None).is_err());
        assert!(sequence_store_key(NumberingScope::StoreWise, Some("  ")).is_err());
    }
}
