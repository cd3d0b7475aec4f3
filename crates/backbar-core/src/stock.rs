//! # Stock Arithmetic
//!
//! Pure stock-level arithmetic shared by the inventory master and the
//! voucher entry flows.
//!
//! ## The One Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   closing = opening + purchase + inward - outward                       │
//! │                                                                         │
//! │   opening   restated opening count (stock-take)                         │
//! │   purchase  received from vendors (purchase vouchers)                   │
//! │   inward    received from other stores (transfer-in)                    │
//! │   outward   sold over the counter + dispatched to other stores         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every write path goes through [`apply`] so the formula cannot drift
//! between the sales, purchase and transfer screens.

use serde::{Deserialize, Serialize};

/// Stock closing balance.
#[inline]
pub const fn closing(opening: i64, purchase: i64, inward: i64, outward: i64) -> i64 {
    opening + purchase + inward - outward
}

/// A movement applied to one store × item × size stock row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Movement {
    /// Vendor purchase received.
    Purchase(i64),
    /// Transfer-in from another store.
    Inward(i64),
    /// Counter sale or transfer-out dispatch.
    Outward(i64),
}

/// Mutable movement columns of a stock row.
///
/// The db layer loads these from `stock_levels`, applies movements, and
/// writes the columns back in the same transaction as the voucher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockColumns {
    pub opening: i64,
    pub purchase: i64,
    pub inward: i64,
    pub outward: i64,
    pub closing: i64,
}

/// Applies a movement and recomputes the closing balance.
///
/// ## Example
/// ```rust
/// use backbar_core::stock::{apply, Movement, StockColumns};
///
/// let mut cols = StockColumns { opening: 10, ..Default::default() };
/// apply(&mut cols, Movement::Purchase(48));
/// apply(&mut cols, Movement::Outward(20));
/// assert_eq!(cols.closing, 38);
/// ```
pub fn apply(cols: &mut StockColumns, movement: Movement) {
    match movement {
        Movement::Purchase(qty) => cols.purchase += qty,
        Movement::Inward(qty) => cols.inward += qty,
        Movement::Outward(qty) => cols.outward += qty,
    }
    cols.closing = closing(cols.opening, cols.purchase, cols.inward, cols.outward);
}

/// Restates the opening count (opening-stock entry screen).
///
/// The closing shifts by the same delta, so movements already booked for the
/// day survive a stock-take correction.
pub fn restate_opening(cols: &mut StockColumns, new_opening: i64) {
    let delta = new_opening - cols.opening;
    cols.opening = new_opening;
    cols.closing += delta;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_formula() {
        assert_eq!(closing(10, 48, 6, 20), 44);
        assert_eq!(closing(0, 0, 0, 5), -5); // negative stock is visible, not hidden
    }

    #[test]
    fn test_apply_sequence() {
        let mut cols = StockColumns {
            opening: 24,
            ..Default::default()
        };
        apply(&mut cols, Movement::Inward(12));
        apply(&mut cols, Movement::Outward(2));
        apply(&mut cols, Movement::Outward(9));
        assert_eq!(cols.inward, 12);
        assert_eq!(cols.outward, 11);
        assert_eq!(cols.closing, 25);
    }

    #[test]
    fn test_restate_opening_preserves_movements() {
        let mut cols = StockColumns {
            opening: 10,
            ..Default::default()
        };
        apply(&mut cols, Movement::Purchase(5));
        apply(&mut cols, Movement::Outward(3));
        assert_eq!(cols.closing, 12);

        // stock-take found 14, not 10
        restate_opening(&mut cols, 14);
        assert_eq!(cols.opening, 14);
        assert_eq!(cols.closing, 16);
    }
}
