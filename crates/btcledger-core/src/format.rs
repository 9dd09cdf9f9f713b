//! Display formatting for quantities and money.
//!
//! Quantities are stored in BTC; [`DisplayUnit`] only changes how they are
//! rendered. Money always renders with two decimals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amount::{btc_to_sats, round, sats_to_btc, BTC_DP, MONEY_DP};
use crate::ledger::Aggregates;

/// Unit used to show bitcoin quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    /// Whole bitcoin, eight decimals.
    #[default]
    Btc,
    /// Satoshis, no decimals.
    Sats,
}

impl FromStr for DisplayUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "btc" => Ok(Self::Btc),
            "sats" | "sat" | "satoshi" | "satoshis" => Ok(Self::Sats),
            _ => Err(format!("unknown display unit: {s}")),
        }
    }
}

impl fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Btc => write!(f, "BTC"),
            Self::Sats => write!(f, "sats"),
        }
    }
}

impl DisplayUnit {
    /// Express a BTC quantity in this unit.
    #[must_use]
    pub fn convert(self, btc: Decimal) -> Decimal {
        match self {
            Self::Btc => btc,
            Self::Sats => btc_to_sats(btc),
        }
    }

    /// Convert a quantity entered in this unit back to BTC.
    #[must_use]
    pub fn to_btc(self, value: Decimal) -> Decimal {
        match self {
            Self::Btc => value,
            Self::Sats => sats_to_btc(value),
        }
    }
}

/// Render a BTC quantity in `unit`.
///
/// ```
/// use btcledger_core::format::{format_quantity, DisplayUnit};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_quantity(dec!(0.5), DisplayUnit::Btc), "0.50000000");
/// assert_eq!(format_quantity(dec!(0.5), DisplayUnit::Sats), "50000000");
/// ```
#[must_use]
pub fn format_quantity(btc: Decimal, unit: DisplayUnit) -> String {
    match unit {
        DisplayUnit::Btc => fixed(btc, BTC_DP),
        DisplayUnit::Sats => fixed(btc_to_sats(btc), 0),
    }
}

/// Render a fiat amount with two decimals.
#[must_use]
pub fn format_money(value: Decimal) -> String {
    fixed(value, MONEY_DP)
}

fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = round(value, dp);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Aggregates rendered for display; losses are shown as a magnitude.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatesDisplay {
    /// Total gains.
    pub total_gains: String,
    /// Absolute value of total losses.
    pub total_losses: String,
    /// Signed net gain.
    pub net_gain: String,
}

impl From<&Aggregates> for AggregatesDisplay {
    fn from(totals: &Aggregates) -> Self {
        Self {
            total_gains: format_money(totals.total_gains),
            total_losses: format_money(totals.total_losses.abs()),
            net_gain: format_money(totals.net_gain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unit_from_str() {
        assert_eq!("BTC".parse::<DisplayUnit>(), Ok(DisplayUnit::Btc));
        assert_eq!("satoshi".parse::<DisplayUnit>(), Ok(DisplayUnit::Sats));
        assert!("mBTC".parse::<DisplayUnit>().is_err());
    }

    #[test]
    fn test_unit_round_trip() {
        assert_eq!(DisplayUnit::Sats.convert(dec!(0.00012345)), dec!(12345));
        assert_eq!(DisplayUnit::Sats.to_btc(dec!(12345)), dec!(0.00012345));
        assert_eq!(DisplayUnit::Btc.to_btc(dec!(1.5)), dec!(1.5));
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(dec!(1), DisplayUnit::Btc), "1.00000000");
        assert_eq!(format_quantity(dec!(0.123456789), DisplayUnit::Btc), "0.12345679");
        assert_eq!(format_quantity(dec!(1.5), DisplayUnit::Sats), "150000000");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(17490)), "17490.00");
        assert_eq!(format_money(dec!(0.005)), "0.01");
        assert_eq!(format_money(dec!(-12.3)), "-12.30");
    }

    #[test]
    fn test_aggregates_display() {
        let totals = Aggregates {
            total_gains: dec!(50),
            total_losses: dec!(-20.5),
            net_gain: dec!(29.5),
        };
        let shown = AggregatesDisplay::from(&totals);
        assert_eq!(shown.total_gains, "50.00");
        assert_eq!(shown.total_losses, "20.50");
        assert_eq!(shown.net_gain, "29.50");
    }
}
