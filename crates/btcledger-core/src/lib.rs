//! Core engine for a bitcoin buy/sell ledger with FIFO cost basis.
//!
//! This crate provides the types and operations of the ledger:
//!
//! - [`BuyLot`] - A purchase with an unconsumed remaining quantity
//! - [`SellRecord`] - A sale with its FIFO cost basis and realized gain/loss
//! - [`Ledger`] - The ordered buys and sells, with add/edit/delete/clear
//! - [`TradeInput`] - Validated trade fields (date, amount, price, fees)
//! - [`fifo`] - The lot matching algorithm
//! - [`format`] - BTC/satoshi and money display helpers
//!
//! Lots are always consumed in insertion order. Each lot's share of a sale's
//! cost is rounded to cents before being summed.
//!
//! # Example
//!
//! ```
//! use btcledger_core::{Ledger, TradeInput, TransactionKind};
//! use rust_decimal_macros::dec;
//!
//! let mut ledger = Ledger::new();
//! ledger.add_buy(TradeInput::parse("2024-01-01", "1", "10000", "0").unwrap()).unwrap();
//! ledger.add_buy(TradeInput::parse("2024-01-02", "1", "20000", "0").unwrap()).unwrap();
//!
//! // Sell 1.5 BTC: all of the first lot and half of the second
//! let sell = ledger
//!     .add_sell(TradeInput::parse("2024-02-01", "1.5", "25000", "10").unwrap())
//!     .unwrap();
//! assert_eq!(sell.cost_basis, dec!(20000));
//! assert_eq!(sell.gain_loss, dec!(17490));
//!
//! // Clearing sells puts every lot back to its full amount
//! ledger.clear_sells();
//! assert_eq!(ledger.available(), dec!(2));
//! assert_eq!(ledger.len(TransactionKind::Sell), 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod error;
pub mod fifo;
pub mod format;
pub mod ledger;
pub mod lot;
pub mod transaction;

pub use error::{LedgerError, ValidationError};
pub use fifo::{FifoMatch, LotMatch};
pub use format::{AggregatesDisplay, DisplayUnit};
pub use ledger::{Aggregates, Ledger};
pub use lot::BuyLot;
pub use transaction::{SellRecord, TradeInput, Transaction, TransactionKind};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
