//! FIFO lot matching.
//!
//! A sale consumes buy lots strictly in insertion order: a lot is touched
//! only once every earlier lot has `remaining == 0`. The cost of each partial
//! consumption is rounded to cents *before* it is added to the cost basis, so
//! the basis is a sum of independently rounded terms.
//!
//! Matching first checks the sale against the total open quantity, then plans
//! every lot's contribution, and only then draws the lots down. Any failure
//! (short inventory or an overflowing cost) is raised before a lot is touched.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::amount::checked_add;
use crate::error::LedgerError;
use crate::lot::BuyLot;

/// One lot's contribution to a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotMatch {
    /// Position of the lot in the buys sequence.
    pub lot_index: usize,
    /// Quantity taken from the lot.
    pub used: Decimal,
    /// `round(used × lot.price, 2)`.
    pub cost: Decimal,
}

/// Result of a successful FIFO match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FifoMatch {
    /// Lots consumed, in the order they were consumed.
    pub matches: Vec<LotMatch>,
    /// Sum of the per-lot rounded costs.
    pub cost_basis: Decimal,
}

/// Total quantity still open across `lots`, saturating at `Decimal::MAX`.
#[must_use]
pub fn available(lots: &[BuyLot]) -> Decimal {
    lots.iter()
        .map(|lot| lot.remaining)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Total quantity still open across `lots`, or [`LedgerError::Overflow`].
pub fn checked_available(lots: &[BuyLot]) -> Result<Decimal, LedgerError> {
    lots.iter().try_fold(Decimal::ZERO, |total, lot| {
        checked_add(total, lot.remaining, "available quantity")
    })
}

/// Match `amount` against `lots` in order, drawing down `remaining`.
///
/// Fails with [`LedgerError::InsufficientInventory`] when `amount` exceeds
/// [`available`]; in that case `lots` is left untouched.
///
/// # Examples
///
/// ```
/// use btcledger_core::fifo::match_fifo;
/// use btcledger_core::{BuyLot, TradeInput};
/// use rust_decimal_macros::dec;
///
/// let mut lots = vec![
///     BuyLot::new(&TradeInput::parse("2024-01-01", "1", "10000", "0").unwrap()),
///     BuyLot::new(&TradeInput::parse("2024-01-02", "1", "20000", "0").unwrap()),
/// ];
///
/// let result = match_fifo(&mut lots, dec!(1.5)).unwrap();
/// assert_eq!(result.cost_basis, dec!(20000));
/// assert_eq!(lots[0].remaining, dec!(0));
/// assert_eq!(lots[1].remaining, dec!(0.5));
/// ```
pub fn match_fifo(lots: &mut [BuyLot], amount: Decimal) -> Result<FifoMatch, LedgerError> {
    let total = checked_available(lots)?;
    if amount > total {
        warn!(requested = %amount, available = %total, "sell exceeds open lots");
        return Err(LedgerError::InsufficientInventory {
            requested: amount,
            available: total,
        });
    }

    let result = plan(lots, amount)?;
    for m in &result.matches {
        let lot = &mut lots[m.lot_index];
        lot.remaining -= m.used;
        debug!(lot = m.lot_index, used = %m.used, cost = %m.cost, left = %lot.remaining, "consumed lot");
    }

    Ok(result)
}

fn plan(lots: &[BuyLot], amount: Decimal) -> Result<FifoMatch, LedgerError> {
    let mut to_match = amount;
    let mut result = FifoMatch::default();

    for (lot_index, lot) in lots.iter().enumerate() {
        if lot.remaining <= Decimal::ZERO {
            continue;
        }

        let used = lot.remaining.min(to_match);
        let cost = lot.cost_of(used)?;
        result.cost_basis = checked_add(result.cost_basis, cost, "cost basis")?;
        to_match -= used;
        result.matches.push(LotMatch {
            lot_index,
            used,
            cost,
        });

        if to_match <= Decimal::ZERO {
            break;
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TradeInput;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn lot(day: u32, amount: Decimal, price: Decimal) -> BuyLot {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        BuyLot::new(&TradeInput::new(date, amount, price, dec!(0)).unwrap())
    }

    #[test]
    fn test_match_single_lot_partial() {
        let mut lots = vec![lot(1, dec!(2), dec!(100))];
        let result = match_fifo(&mut lots, dec!(0.5)).unwrap();

        assert_eq!(result.cost_basis, dec!(50));
        assert_eq!(lots[0].remaining, dec!(1.5));
        assert_eq!(
            result.matches,
            vec![LotMatch {
                lot_index: 0,
                used: dec!(0.5),
                cost: dec!(50)
            }]
        );
    }

    #[test]
    fn test_match_spans_lots_in_order() {
        let mut lots = vec![
            lot(1, dec!(1), dec!(100)),
            lot(2, dec!(1), dec!(200)),
            lot(3, dec!(1), dec!(300)),
        ];
        let result = match_fifo(&mut lots, dec!(1.5)).unwrap();

        // 1 * 100 + 0.5 * 200
        assert_eq!(result.cost_basis, dec!(200));
        assert_eq!(lots[0].remaining, dec!(0));
        assert_eq!(lots[1].remaining, dec!(0.5));
        assert_eq!(lots[2].remaining, dec!(1));
        assert_eq!(result.matches.len(), 2);
    }

    #[test]
    fn test_match_skips_exhausted_lots() {
        let mut lots = vec![lot(1, dec!(1), dec!(100)), lot(2, dec!(1), dec!(200))];
        lots[0].remaining = dec!(0);

        let result = match_fifo(&mut lots, dec!(0.25)).unwrap();
        assert_eq!(result.matches[0].lot_index, 1);
        assert_eq!(result.cost_basis, dec!(50));
    }

    #[test]
    fn test_match_uses_insertion_order_not_date() {
        // Newer lot inserted first is still consumed first.
        let mut lots = vec![lot(20, dec!(1), dec!(300)), lot(1, dec!(1), dec!(100))];
        let result = match_fifo(&mut lots, dec!(1)).unwrap();
        assert_eq!(result.cost_basis, dec!(300));
        assert_eq!(lots[1].remaining, dec!(1));
    }

    #[test]
    fn test_match_exact_total() {
        let mut lots = vec![lot(1, dec!(0.3), dec!(100)), lot(2, dec!(0.7), dec!(100))];
        let result = match_fifo(&mut lots, dec!(1)).unwrap();
        assert_eq!(result.cost_basis, dec!(100));
        assert_eq!(available(&lots), dec!(0));
    }

    #[test]
    fn test_match_insufficient_leaves_lots_untouched() {
        let mut lots = vec![lot(1, dec!(1), dec!(100)), lot(2, dec!(0.5), dec!(200))];
        let before = lots.clone();

        let err = match_fifo(&mut lots, dec!(1.6)).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientInventory {
                requested: dec!(1.6),
                available: dec!(1.5),
            }
        );
        assert_eq!(lots, before);
    }

    #[test]
    fn test_match_empty_inventory() {
        let mut lots: Vec<BuyLot> = Vec::new();
        let err = match_fifo(&mut lots, dec!(0.1)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientInventory { .. }));
    }

    #[test]
    fn test_per_lot_rounding() {
        // Each term is rounded before summing:
        //   round(0.5 * 0.01) = round(0.005) = 0.01, twice -> 0.02
        // Rounding the sum instead would give round(0.01) = 0.01.
        let mut lots = vec![lot(1, dec!(0.5), dec!(0.01)), lot(2, dec!(0.5), dec!(0.01))];
        let result = match_fifo(&mut lots, dec!(1)).unwrap();
        assert_eq!(result.cost_basis, dec!(0.02));
    }

    /// A lot built directly, skipping `TradeInput` bounds, as a corrupted
    /// blob would produce.
    fn raw_lot(amount: Decimal, price: Decimal) -> BuyLot {
        BuyLot {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount,
            price,
            fees: dec!(0),
            remaining: amount,
        }
    }

    #[test]
    fn test_lot_cost_overflow_leaves_lots_untouched() {
        let mut lots = vec![raw_lot(dec!(100000000000000000000), dec!(10000000000))];
        let before = lots.clone();

        let err = match_fifo(&mut lots, dec!(100000000000000000000)).unwrap_err();
        assert_eq!(err, LedgerError::Overflow { what: "lot cost" });
        assert_eq!(lots, before);
    }

    #[test]
    fn test_cost_basis_overflow_leaves_lots_untouched() {
        // Each lot costs 5e28 on its own; the two together do not fit.
        let mut lots = vec![
            raw_lot(dec!(500000000000000), dec!(100000000000000)),
            lot(2, dec!(1), dec!(100)),
            raw_lot(dec!(500000000000000), dec!(100000000000000)),
        ];
        lots[1].remaining = dec!(0);
        let before = lots.clone();

        let err = match_fifo(&mut lots, dec!(1000000000000000)).unwrap_err();
        assert_eq!(err, LedgerError::Overflow { what: "cost basis" });
        assert_eq!(lots, before);
    }

    #[test]
    fn test_available_total_overflow() {
        let big = Decimal::MAX / dec!(2) + dec!(1);
        let mut lots = vec![raw_lot(big, dec!(0)), raw_lot(big, dec!(0))];

        assert_eq!(available(&lots), Decimal::MAX);
        assert_eq!(
            checked_available(&lots),
            Err(LedgerError::Overflow { what: "available quantity" })
        );
        let err = match_fifo(&mut lots, dec!(1)).unwrap_err();
        assert_eq!(err, LedgerError::Overflow { what: "available quantity" });
    }
}
