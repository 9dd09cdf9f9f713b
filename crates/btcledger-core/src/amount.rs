//! Decimal rounding and bitcoin unit conversion.
//!
//! All money values in the ledger are rounded half-away-from-zero to
//! [`MONEY_DP`] places. Rounding is done on the decimal value itself, so
//! there is no float-to-string round trip and no exponent-notation edge case
//! at very small or very large magnitudes.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::LedgerError;

/// Decimal places kept for fiat amounts (cost basis, gain/loss).
pub const MONEY_DP: u32 = 2;

/// Decimal places of one satoshi expressed in BTC.
pub const BTC_DP: u32 = 8;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Largest quantity a single trade may carry: the 21 million BTC supply cap.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(21_000_000, 0, 0, false, 0);

/// Largest unit price or fee a trade may carry: 10^12.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// `a × b`, or [`LedgerError::Overflow`] naming `what`.
pub fn checked_mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::Overflow { what })
}

/// `a + b`, or [`LedgerError::Overflow`] naming `what`.
pub fn checked_add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow { what })
}

/// `a − b`, or [`LedgerError::Overflow`] naming `what`.
pub fn checked_sub(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::Overflow { what })
}

/// Round `value` to `decimals` places, with midpoints rounded away from zero.
///
/// # Examples
///
/// ```
/// use btcledger_core::amount::round;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round(dec!(1.005), 2), dec!(1.01));
/// assert_eq!(round(dec!(-1.005), 2), dec!(-1.01));
/// assert_eq!(round(dec!(2.5), 0), dec!(3));
/// ```
#[must_use]
pub fn round(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a fiat amount to cents.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    round(value, MONEY_DP)
}

/// Convert a BTC quantity to whole satoshis.
#[must_use]
pub fn btc_to_sats(btc: Decimal) -> Decimal {
    round(btc * SATS_PER_BTC, 0)
}

/// Convert a satoshi count to BTC.
#[must_use]
pub fn sats_to_btc(sats: Decimal) -> Decimal {
    sats / SATS_PER_BTC
}
