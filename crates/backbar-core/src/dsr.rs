//! # Daily Sale Report Reconciliation
//!
//! The DSR is the end-of-day balancing act: for every item × size the stock
//! movement must close, and the money side must settle to zero.
//!
//! ## The Two Balances
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  STOCK (per item × size)                                                │
//! │    closing = opening + inward - outward - sale                          │
//! │                                                                         │
//! │  MONEY (per business date)                                              │
//! │    item sales + other sales  =  tenders + expenses                      │
//! │    variance must be zero for a balanced day                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is aggregation over flat rows - the point of keeping it in
//! core is that the API layer, the Excel export and the tests all reconcile
//! through the same functions.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{DsrLine, LedgerKind};

// =============================================================================
// Line Arithmetic
// =============================================================================

/// DSR line closing balance.
///
/// Unlike the running stock formula, purchases reach a store's DSR as
/// transfer inward, so the purchase column does not appear here.
#[inline]
pub const fn line_closing(opening: i64, inward: i64, outward: i64, sale: i64) -> i64 {
    opening + inward - outward - sale
}

// =============================================================================
// Sorting
// =============================================================================

/// Ordering used for size columns and ledger rows on the report.
///
/// Rows with a positive `sort_order` come first, ascending; everything else
/// follows alphabetically (case-insensitive).
pub fn report_order(sort_a: i64, name_a: &str, sort_b: i64, name_b: &str) -> Ordering {
    let key_a = if sort_a > 0 { sort_a } else { i64::MAX };
    let key_b = if sort_b > 0 { sort_b } else { i64::MAX };
    key_a
        .cmp(&key_b)
        .then_with(|| name_a.to_lowercase().cmp(&name_b.to_lowercase()))
}

// =============================================================================
// Size Totals
// =============================================================================

/// Grand totals of one size column across all items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTotal {
    pub size_code: String,
    pub size_name: String,
    pub opening: i64,
    pub inward: i64,
    pub outward: i64,
    pub sale: i64,
    pub closing: i64,
    pub sale_amount_paise: i64,
}

/// Accumulates per-size grand totals in the order sizes first appear.
pub fn size_totals(lines: &[DsrLine]) -> Vec<SizeTotal> {
    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, SizeTotal> = HashMap::new();

    for line in lines {
        let entry = map.entry(line.size_code.clone()).or_insert_with(|| {
            order.push(line.size_code.clone());
            SizeTotal {
                size_code: line.size_code.clone(),
                size_name: line.size_name.clone(),
                ..Default::default()
            }
        });
        entry.opening += line.opening;
        entry.inward += line.inward;
        entry.outward += line.outward;
        entry.sale += line.sale;
        entry.closing += line.closing;
        entry.sale_amount_paise += line.sale_amount().paise();
    }

    order.into_iter().filter_map(|code| map.remove(&code)).collect()
}

// =============================================================================
// Category Totals
// =============================================================================

/// Sale value aggregated per category, in first-seen order.
///
/// `item_category` maps item_code → category name; items without a mapping
/// land under "Unknown Category".
pub fn category_totals(
    lines: &[DsrLine],
    item_category: &HashMap<String, String>,
) -> Vec<(String, Money)> {
    let mut order: Vec<String> = Vec::new();
    let mut map: HashMap<String, Money> = HashMap::new();

    for line in lines {
        let amount = line.sale_amount();
        if amount.is_zero() {
            continue;
        }
        let category = item_category
            .get(&line.item_code)
            .cloned()
            .unwrap_or_else(|| "Unknown Category".to_string());
        let entry = map.entry(category.clone()).or_insert_with(|| {
            order.push(category);
            Money::zero()
        });
        *entry += amount;
    }

    order
        .into_iter()
        .filter_map(|cat| map.remove_entry(&cat))
        .collect()
}

// =============================================================================
// Ledger Totals
// =============================================================================

/// Ledger totals for one business date, split by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Per-code totals, in first-seen order, for each kind.
    pub other_sales: Vec<(String, Money)>,
    pub expenses: Vec<(String, Money)>,
    pub tenders: Vec<(String, Money)>,
    pub total_other_sale: Money,
    pub total_expense: Money,
    pub total_tender: Money,
}

impl LedgerTotals {
    /// Folds one ledger entry into the totals.
    ///
    /// Sale-kind entries count as other sales: the liquor sale itself is
    /// carried by the item lines, so any sale-side ledger is "other".
    pub fn accumulate(&mut self, ledger_code: &str, kind: LedgerKind, amount: Money) {
        let bucket = match kind {
            LedgerKind::Sale | LedgerKind::OtherSale => {
                self.total_other_sale += amount;
                &mut self.other_sales
            }
            LedgerKind::Expense => {
                self.total_expense += amount;
                &mut self.expenses
            }
            LedgerKind::Tender => {
                self.total_tender += amount;
                &mut self.tenders
            }
        };
        match bucket.iter_mut().find(|(code, _)| code == ledger_code) {
            Some((_, total)) => *total += amount,
            None => bucket.push((ledger_code.to_string(), amount)),
        }
    }

    /// Builds totals from `(ledger_code, kind, amount)` triples.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, LedgerKind, Money)>,
    {
        let mut totals = LedgerTotals::default();
        for (code, kind, amount) in entries {
            totals.accumulate(code, kind, amount);
        }
        totals
    }
}

// =============================================================================
// Day Summary
// =============================================================================

/// The reconciled money position of one store-day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    /// Σ mrp × sale over the DSR lines.
    pub item_sale: Money,
    pub other_sale: Money,
    pub expense: Money,
    pub tender: Money,
    /// `(item_sale + other_sale) - (tender + expense)`; zero when balanced.
    pub variance: Money,
}

impl DaySummary {
    pub fn is_balanced(&self) -> bool {
        self.variance.is_zero()
    }
}

/// Computes the day summary from DSR lines and ledger totals.
pub fn summarize(lines: &[DsrLine], ledgers: &LedgerTotals) -> DaySummary {
    let item_sale = Money::sum(lines.iter().map(|l| l.sale_amount()));
    let variance =
        item_sale + ledgers.total_other_sale - ledgers.total_tender - ledgers.total_expense;
    DaySummary {
        item_sale,
        other_sale: ledgers.total_other_sale,
        expense: ledgers.total_expense,
        tender: ledgers.total_tender,
        variance,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn line(item: &str, size: &str, mrp: i64, opening: i64, sale: i64) -> DsrLine {
        DsrLine {
            id: String::new(),
            store_code: "S001".into(),
            dsr_date: NaiveDate::from_ymd_opt(2026, 1, 4).unwrap(),
            item_code: item.into(),
            item_name: item.into(),
            size_code: size.into(),
            size_name: size.into(),
            purchase_price_paise: mrp - 5_000,
            mrp_paise: mrp,
            opening,
            inward: 0,
            outward: 0,
            sale,
            closing: line_closing(opening, 0, 0, sale),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_closing() {
        assert_eq!(line_closing(24, 12, 2, 9), 25);
        assert_eq!(line_closing(0, 0, 0, 3), -3);
    }

    #[test]
    fn test_report_order() {
        // explicit order wins over names
        assert_eq!(report_order(1, "750ml", 2, "180ml"), Ordering::Less);
        // unordered rows fall back to case-insensitive names
        assert_eq!(report_order(0, "beer", 0, "Whisky"), Ordering::Less);
        // ordered rows come before unordered ones
        assert_eq!(report_order(5, "zzz", 0, "aaa"), Ordering::Less);
    }

    #[test]
    fn test_size_totals() {
        let lines = vec![
            line("IT001", "750", 52_000, 10, 2),
            line("IT002", "750", 30_000, 5, 1),
            line("IT001", "375", 26_000, 8, 3),
        ];
        let totals = size_totals(&lines);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].size_code, "750");
        assert_eq!(totals[0].opening, 15);
        assert_eq!(totals[0].sale, 3);
        assert_eq!(totals[0].sale_amount_paise, 52_000 * 2 + 30_000);
        assert_eq!(totals[1].size_code, "375");
        assert_eq!(totals[1].sale_amount_paise, 26_000 * 3);
    }

    #[test]
    fn test_category_totals_skips_zero_sales() {
        let lines = vec![
            line("IT001", "750", 52_000, 10, 2),
            line("IT002", "750", 30_000, 5, 0),
            line("IT003", "180", 9_000, 5, 4),
        ];
        let mut categories = HashMap::new();
        categories.insert("IT001".to_string(), "Whisky".to_string());
        // IT003 has no category mapping

        let totals = category_totals(&lines, &categories);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].0, "Whisky");
        assert_eq!(totals[0].1.paise(), 104_000);
        assert_eq!(totals[1].0, "Unknown Category");
        assert_eq!(totals[1].1.paise(), 36_000);
    }

    #[test]
    fn test_ledger_totals_buckets() {
        let totals = LedgerTotals::from_entries([
            ("LDG-SODA", LedgerKind::OtherSale, Money::from_paise(5_000)),
            ("LDG-CASH", LedgerKind::Tender, Money::from_paise(100_000)),
            ("LDG-UPI", LedgerKind::Tender, Money::from_paise(9_000)),
            ("LDG-TEA", LedgerKind::Expense, Money::from_paise(500)),
            ("LDG-CASH", LedgerKind::Tender, Money::from_paise(1_000)),
        ]);
        assert_eq!(totals.total_other_sale.paise(), 5_000);
        assert_eq!(totals.total_expense.paise(), 500);
        assert_eq!(totals.total_tender.paise(), 110_000);
        // per-code accumulation keeps first-seen order
        assert_eq!(totals.tenders[0], ("LDG-CASH".to_string(), Money::from_paise(101_000)));
        assert_eq!(totals.tenders[1].0, "LDG-UPI");
    }

    #[test]
    fn test_day_balances_to_zero() {
        let lines = vec![line("IT001", "750", 52_000, 10, 2)]; // ₹1040 item sale
        let ledgers = LedgerTotals::from_entries([
            ("LDG-SODA", LedgerKind::OtherSale, Money::from_paise(5_000)),
            ("LDG-TEA", LedgerKind::Expense, Money::from_paise(2_000)),
            ("LDG-CASH", LedgerKind::Tender, Money::from_paise(107_000)),
        ]);
        let summary = summarize(&lines, &ledgers);
        assert_eq!(summary.item_sale.paise(), 104_000);
        assert!(summary.is_balanced());
    }

    #[test]
    fn test_day_variance_surfaces_shortage() {
        let lines = vec![line("IT001", "750", 52_000, 10, 2)];
        let ledgers = LedgerTotals::from_entries([
            // till is ₹40 short
            ("LDG-CASH", LedgerKind::Tender, Money::from_paise(100_000)),
        ]);
        let summary = summarize(&lines, &ledgers);
        assert_eq!(summary.variance.paise(), 4_000);
        assert!(!summary.is_balanced());
    }
}
