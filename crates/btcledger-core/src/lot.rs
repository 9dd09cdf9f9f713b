//! Buy lots: purchases with an unconsumed remaining quantity.
//!
//! A [`BuyLot`] is created by a buy with `remaining == amount`. FIFO matching
//! draws `remaining` down; only [`Ledger::clear_sells`](crate::Ledger::clear_sells)
//! and [`Ledger::rebuild`](crate::Ledger::rebuild) put it back.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::{checked_mul, round_money};
use crate::error::{LedgerError, ValidationError};
use crate::transaction::TradeInput;

/// A purchase lot.
///
/// # Examples
///
/// ```
/// use btcledger_core::{BuyLot, TradeInput};
/// use rust_decimal_macros::dec;
///
/// let input = TradeInput::parse("2024-01-15", "0.25", "40000", "3").unwrap();
/// let lot = BuyLot::new(&input);
/// assert_eq!(lot.remaining, dec!(0.25));
/// assert!(lot.is_open());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyLot {
    /// Purchase date.
    pub date: NaiveDate,
    /// Quantity bought in BTC.
    pub amount: Decimal,
    /// Unit purchase price.
    pub price: Decimal,
    /// Fees paid on the purchase. Not part of the FIFO cost basis.
    pub fees: Decimal,
    /// Quantity not yet consumed by sells, `0 ≤ remaining ≤ amount`.
    pub remaining: Decimal,
}

impl BuyLot {
    /// Create a fresh lot with nothing consumed.
    #[must_use]
    pub const fn new(input: &TradeInput) -> Self {
        Self {
            date: input.date,
            amount: input.amount,
            price: input.price,
            fees: input.fees,
            remaining: input.amount,
        }
    }

    /// The fields this lot was built from.
    #[must_use]
    pub const fn input(&self) -> TradeInput {
        TradeInput {
            date: self.date,
            amount: self.amount,
            price: self.price,
            fees: self.fees,
        }
    }

    /// Whether any quantity is left to match.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.remaining > Decimal::ZERO
    }

    /// Check the trade fields and `0 ≤ remaining ≤ amount`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.input().validate()?;
        if self.remaining < Decimal::ZERO {
            return Err(ValidationError::new("remaining", "must not be negative"));
        }
        if self.remaining > self.amount {
            return Err(ValidationError::new(
                "remaining",
                format!("{} exceeds amount {}", self.remaining, self.amount),
            ));
        }
        Ok(())
    }

    /// Put the whole amount back.
    pub fn reset(&mut self) {
        self.remaining = self.amount;
    }

    /// Cost of `quantity` units of this lot, rounded to cents.
    pub fn cost_of(&self, quantity: Decimal) -> Result<Decimal, LedgerError> {
        checked_mul(quantity, self.price, "lot cost").map(round_money)
    }

    /// Cost of the still-open part of this lot.
    pub fn open_cost(&self) -> Result<Decimal, LedgerError> {
        self.cost_of(self.remaining)
    }
}

impl fmt::Display for BuyLot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} BTC @ {}",
            self.date, self.remaining, self.amount, self.price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lot(amount: Decimal, price: Decimal) -> BuyLot {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        BuyLot::new(&TradeInput::new(date, amount, price, dec!(0)).unwrap())
    }

    #[test]
    fn test_new_lot_is_untouched() {
        let lot = lot(dec!(2), dec!(100));
        assert_eq!(lot.remaining, lot.amount);
        assert!(lot.is_open());
        assert!(lot.validate().is_ok());
    }

    #[test]
    fn test_reset() {
        let mut lot = lot(dec!(2), dec!(100));
        lot.remaining = dec!(0);
        assert!(!lot.is_open());

        lot.reset();
        assert_eq!(lot.remaining, dec!(2));
    }

    #[test]
    fn test_cost_of_rounds_to_cents() {
        let lot = lot(dec!(1), dec!(33333.333));
        assert_eq!(lot.cost_of(dec!(0.5)), Ok(dec!(16666.67)));
        assert_eq!(lot.open_cost(), Ok(dec!(33333.33)));
    }

    #[test]
    fn test_cost_of_overflow_is_an_error() {
        let lot = lot(dec!(1), dec!(1000000000000));
        assert_eq!(
            lot.cost_of(Decimal::MAX),
            Err(LedgerError::Overflow { what: "lot cost" })
        );
    }

    #[test]
    fn test_validate_remaining() {
        let mut lot = lot(dec!(0.3), dec!(100));
        lot.remaining = dec!(0.30000000000000004);
        assert_eq!(lot.validate().unwrap_err().field, "remaining");

        lot.remaining = dec!(-0.1);
        assert_eq!(lot.validate().unwrap_err().field, "remaining");

        lot.remaining = dec!(0);
        assert!(lot.validate().is_ok());

        lot.amount = dec!(100000000000000000000);
        assert_eq!(lot.validate().unwrap_err().field, "amount");
    }

    #[test]
    fn test_display() {
        let mut lot = lot(dec!(1), dec!(10000));
        lot.remaining = dec!(0.5);
        assert_eq!(lot.to_string(), "2024-01-01 0.5/1 BTC @ 10000");
    }

    #[test]
    fn test_deserialize_browser_blob() {
        let lot: BuyLot = serde_json::from_str(
            r#"{"date":"2024-01-01","amount":1,"price":10000,"fees":5,"remaining":0.5}"#,
        )
        .unwrap();
        assert_eq!(lot.amount, dec!(1));
        assert_eq!(lot.remaining, dec!(0.5));
        assert_eq!(lot.fees, dec!(5));
    }
}
