//! Data transfer objects for WASM serialization.
//!
//! These types give JavaScript a string-based view of the ledger so that form
//! values go in unchanged and display values come out ready to render.

use btcledger_core::format::{format_money, format_quantity};
use btcledger_core::{
    AggregatesDisplay, BuyLot, DisplayUnit, SellRecord, TradeInput, Transaction, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Raw trade fields as typed into the form.
///
/// `amount` is read in `unit`, or in the session's display unit when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeFields {
    /// Trade date, `YYYY-MM-DD`.
    pub date: String,
    /// Quantity.
    pub amount: String,
    /// Price per BTC.
    pub price: String,
    /// Fees; empty means zero.
    #[serde(default)]
    pub fees: String,
    /// Unit `amount` is expressed in.
    #[serde(default)]
    pub unit: Option<String>,
}

impl TradeFields {
    /// Validate the fields and convert the amount to BTC.
    ///
    /// `default_unit` applies when the fields name no unit.
    pub fn to_input(&self, default_unit: DisplayUnit) -> Result<TradeInput, ValidationError> {
        let unit = parse_unit(self.unit.as_deref(), default_unit)?;
        let fees = if self.fees.trim().is_empty() {
            "0"
        } else {
            self.fees.as_str()
        };
        let mut input = TradeInput::parse(&self.date, &self.amount, &self.price, fees)?;
        input.amount = unit.to_btc(input.amount);
        input.validate()?;
        Ok(input)
    }
}

/// Parse an optional unit name. Absent or blank names give `default`.
pub fn parse_unit(unit: Option<&str>, default: DisplayUnit) -> Result<DisplayUnit, ValidationError> {
    match unit {
        None => Ok(default),
        Some(s) if s.trim().is_empty() => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|message: String| ValidationError::new("unit", message)),
    }
}

/// A buy lot for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyJson {
    /// Position in the buy list.
    pub index: usize,
    /// Trade date.
    pub date: String,
    /// Quantity bought.
    pub amount: String,
    /// Price per BTC.
    pub price: String,
    /// Fees paid.
    pub fees: String,
    /// Quantity not yet sold.
    pub remaining: String,
}

impl BuyJson {
    /// Render `lot` in `unit`.
    #[must_use]
    pub fn new(index: usize, lot: &BuyLot, unit: DisplayUnit) -> Self {
        Self {
            index,
            date: lot.date.to_string(),
            amount: format_quantity(lot.amount, unit),
            price: format_money(lot.price),
            fees: format_money(lot.fees),
            remaining: format_quantity(lot.remaining, unit),
        }
    }
}

/// A sell record for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellJson {
    /// Position in the sell list.
    pub index: usize,
    /// Trade date.
    pub date: String,
    /// Quantity sold.
    pub amount: String,
    /// Price per BTC.
    pub price: String,
    /// Fees paid.
    pub fees: String,
    /// FIFO cost basis.
    pub cost_basis: String,
    /// Realized gain (positive) or loss (negative).
    pub gain_loss: String,
}

impl SellJson {
    /// Render `sell` in `unit`.
    #[must_use]
    pub fn new(index: usize, sell: &SellRecord, unit: DisplayUnit) -> Self {
        Self {
            index,
            date: sell.date.to_string(),
            amount: format_quantity(sell.amount, unit),
            price: format_money(sell.price),
            fees: format_money(sell.fees),
            cost_basis: format_money(sell.cost_basis),
            gain_loss: format_money(sell.gain_loss),
        }
    }
}

/// A buy or sell for display, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TransactionJson {
    Buy(BuyJson),
    Sell(SellJson),
}

impl TransactionJson {
    /// Render `tx` in `unit`.
    #[must_use]
    pub fn new(index: usize, tx: &Transaction, unit: DisplayUnit) -> Self {
        match tx {
            Transaction::Buy(lot) => Self::Buy(BuyJson::new(index, lot, unit)),
            Transaction::Sell(sell) => Self::Sell(SellJson::new(index, sell, unit)),
        }
    }
}

/// Realized totals plus the open quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryJson {
    /// Gains, losses (as a magnitude) and net.
    #[serde(flatten)]
    pub totals: AggregatesDisplay,
    /// BTC still held.
    pub available: String,
    /// Cost of the BTC still held.
    pub open_cost: String,
    /// Unit `available` is shown in.
    pub unit: String,
}
