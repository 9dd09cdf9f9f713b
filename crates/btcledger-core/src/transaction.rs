//! Trade input, sell records, and the transaction kinds.
//!
//! A [`TradeInput`] is the four fields a user enters for any trade. A buy
//! turns it into a [`BuyLot`]; a sell turns it into a [`SellRecord`] once
//! FIFO matching has produced a cost basis.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::amount::{checked_mul, checked_sub, round_money, MAX_AMOUNT, MAX_MONEY};
use crate::error::{LedgerError, ValidationError};
use crate::lot::BuyLot;

/// Date format accepted from form input.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which sequence of the ledger a transaction lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// A purchase, kept as an open lot.
    Buy,
    /// A sale, matched against open lots.
    Sell,
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(format!("unknown transaction kind: {s}")),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// The fields of a trade as entered by the user.
///
/// # Examples
///
/// ```
/// use btcledger_core::TradeInput;
/// use rust_decimal_macros::dec;
///
/// let input = TradeInput::parse("2024-03-01", "0.5", "62000", "4.99").unwrap();
/// assert_eq!(input.amount, dec!(0.5));
///
/// assert!(TradeInput::parse("", "0.5", "62000", "0").is_err());
/// assert!(TradeInput::parse("2024-03-01", "abc", "62000", "0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeInput {
    /// Trade date.
    pub date: NaiveDate,
    /// Quantity in BTC.
    pub amount: Decimal,
    /// Unit price in fiat.
    pub price: Decimal,
    /// Fees paid in fiat.
    pub fees: Decimal,
}

impl TradeInput {
    /// Create a validated trade input.
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        price: Decimal,
        fees: Decimal,
    ) -> Result<Self, ValidationError> {
        let input = Self {
            date,
            amount,
            price,
            fees,
        };
        input.validate()?;
        Ok(input)
    }

    /// Parse and validate raw form fields.
    pub fn parse(
        date: &str,
        amount: &str,
        price: &str,
        fees: &str,
    ) -> Result<Self, ValidationError> {
        let date = parse_date(date)?;
        let amount = parse_number("amount", amount)?;
        let price = parse_number("price", price)?;
        let fees = parse_number("fees", fees)?;
        Self::new(date, amount, price, fees)
    }

    /// Check the range constraints: 0 < amount ≤ [`MAX_AMOUNT`],
    /// 0 ≤ price ≤ [`MAX_MONEY`], 0 ≤ fees ≤ [`MAX_MONEY`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::new("amount", "must be greater than zero"));
        }
        if self.amount > MAX_AMOUNT {
            return Err(ValidationError::new(
                "amount",
                format!("must not exceed {MAX_AMOUNT} BTC"),
            ));
        }
        check_money("price", self.price)?;
        check_money("fees", self.fees)
    }

    /// Gross proceeds (or outlay) of the trade: amount × price.
    pub fn gross(&self) -> Result<Decimal, LedgerError> {
        checked_mul(self.amount, self.price, "trade value")
    }
}

fn check_money(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    if value > MAX_MONEY {
        return Err(ValidationError::new(
            field,
            format!("must not exceed {MAX_MONEY}"),
        ));
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::new("date", "is required"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        ValidationError::new("date", format!("'{raw}' is not a YYYY-MM-DD date ({e})"))
    })
}

fn parse_number(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| ValidationError::new(field, format!("'{raw}' is not a number")))
}

/// A completed sale with its FIFO cost basis and realized gain or loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRecord {
    /// Sale date.
    pub date: NaiveDate,
    /// Quantity sold in BTC.
    pub amount: Decimal,
    /// Unit sale price.
    pub price: Decimal,
    /// Fees paid on the sale.
    pub fees: Decimal,
    /// Sum of the per-lot rounded costs consumed by this sale.
    pub cost_basis: Decimal,
    /// `round(amount × price − fees − cost_basis, 2)`.
    pub gain_loss: Decimal,
}

impl SellRecord {
    /// Build a sell record from its input and a matched cost basis.
    pub fn new(input: &TradeInput, cost_basis: Decimal) -> Result<Self, LedgerError> {
        let net = checked_sub(input.gross()?, input.fees, "gain/loss")?;
        let gain_loss = round_money(checked_sub(net, cost_basis, "gain/loss")?);
        Ok(Self {
            date: input.date,
            amount: input.amount,
            price: input.price,
            fees: input.fees,
            cost_basis,
            gain_loss,
        })
    }

    /// The fields this record was built from.
    #[must_use]
    pub const fn input(&self) -> TradeInput {
        TradeInput {
            date: self.date,
            amount: self.amount,
            price: self.price,
            fees: self.fees,
        }
    }

    /// Whether the sale realized a gain.
    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.gain_loss > Decimal::ZERO
    }

    /// Whether the sale realized a loss.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.gain_loss < Decimal::ZERO
    }
}

/// A record from either sequence of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transaction {
    /// A buy lot.
    Buy(BuyLot),
    /// A sell record.
    Sell(SellRecord),
}

impl Transaction {
    /// Which sequence this record belongs to.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::Buy(_) => TransactionKind::Buy,
            Self::Sell(_) => TransactionKind::Sell,
        }
    }

    /// Trade date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Buy(b) => b.date,
            Self::Sell(s) => s.date,
        }
    }

    /// Quantity in BTC.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        match self {
            Self::Buy(b) => b.amount,
            Self::Sell(s) => s.amount,
        }
    }
}
