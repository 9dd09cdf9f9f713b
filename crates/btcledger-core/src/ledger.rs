//! The ledger engine: buy lots, sell records, and the operations on them.
//!
//! Edits and deletes replace or remove a record by position and do not
//! cascade. Editing a buy resets its `remaining` without revisiting the sells
//! that consumed it; editing a sell re-matches against the *current* lots
//! without first returning what the old version consumed; deleting a sell
//! does not return its quantity. [`Ledger::clear_sells`] and
//! [`Ledger::rebuild`] are the two explicit ways to restore consistency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::amount::checked_add;
use crate::error::LedgerError;
use crate::fifo::{self, FifoMatch};
use crate::lot::BuyLot;
use crate::transaction::{SellRecord, TradeInput, Transaction, TransactionKind};

/// Realized gain/loss totals across all sells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Sum of positive gain/loss values.
    pub total_gains: Decimal,
    /// Sum of negative gain/loss values (kept negative).
    pub total_losses: Decimal,
    /// `total_gains + total_losses`.
    pub net_gain: Decimal,
}

/// A single-holder ledger of bitcoin buys and sells.
///
/// # Examples
///
/// ```
/// use btcledger_core::{Ledger, TradeInput};
/// use rust_decimal_macros::dec;
///
/// let mut ledger = Ledger::new();
/// ledger.add_buy(TradeInput::parse("2024-01-01", "1", "10000", "0").unwrap()).unwrap();
/// ledger.add_buy(TradeInput::parse("2024-01-02", "1", "20000", "0").unwrap()).unwrap();
///
/// let sell = ledger
///     .add_sell(TradeInput::parse("2024-02-01", "1.5", "25000", "10").unwrap())
///     .unwrap();
/// assert_eq!(sell.cost_basis, dec!(20000));
/// assert_eq!(sell.gain_loss, dec!(17490));
///
/// assert_eq!(ledger.available(), dec!(0.5));
/// assert_eq!(ledger.compute_aggregates().net_gain, dec!(17490));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    buys: Vec<BuyLot>,
    #[serde(default)]
    sells: Vec<SellRecord>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buy lots in matching order.
    #[must_use]
    pub fn buys(&self) -> &[BuyLot] {
        &self.buys
    }

    /// Sell records in the order they were recorded.
    #[must_use]
    pub fn sells(&self) -> &[SellRecord] {
        &self.sells
    }

    /// Check if the ledger holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Number of records in the given sequence.
    #[must_use]
    pub fn len(&self, kind: TransactionKind) -> usize {
        match kind {
            TransactionKind::Buy => self.buys.len(),
            TransactionKind::Sell => self.sells.len(),
        }
    }

    /// All records, buys first, then sells.
    pub fn transactions(&self) -> impl Iterator<Item = Transaction> + '_ {
        self.buys
            .iter()
            .cloned()
            .map(Transaction::Buy)
            .chain(self.sells.iter().cloned().map(Transaction::Sell))
    }

    /// Total quantity still open across all buy lots.
    #[must_use]
    pub fn available(&self) -> Decimal {
        fifo::available(&self.buys)
    }

    /// Cost of the still-open part of every lot, each rounded to cents.
    pub fn open_cost(&self) -> Result<Decimal, LedgerError> {
        self.buys.iter().try_fold(Decimal::ZERO, |total, lot| {
            checked_add(total, lot.open_cost()?, "open cost")
        })
    }

    /// Check every stored record against the trade bounds and
    /// `0 ≤ remaining ≤ amount`, as needed for a ledger read from storage.
    pub fn validate(&self) -> Result<(), LedgerError> {
        for (index, lot) in self.buys.iter().enumerate() {
            lot.validate().map_err(|source| LedgerError::InvalidRecord {
                kind: TransactionKind::Buy,
                index,
                source,
            })?;
        }
        for (index, sell) in self.sells.iter().enumerate() {
            sell.input()
                .validate()
                .map_err(|source| LedgerError::InvalidRecord {
                    kind: TransactionKind::Sell,
                    index,
                    source,
                })?;
        }
        fifo::checked_available(&self.buys)?;
        Ok(())
    }

    /// Append a buy lot with `remaining == amount`.
    pub fn add_buy(&mut self, input: TradeInput) -> Result<&BuyLot, LedgerError> {
        input.validate()?;
        let lot = BuyLot::new(&input);
        debug!(date = %lot.date, amount = %lot.amount, price = %lot.price, "added buy");
        self.buys.push(lot);
        Ok(&self.buys[self.buys.len() - 1])
    }

    /// Match a sale against the open lots and append its record.
    ///
    /// On [`LedgerError::InsufficientInventory`] no lot is touched and nothing
    /// is appended.
    pub fn add_sell(&mut self, input: TradeInput) -> Result<&SellRecord, LedgerError> {
        let (sell, _) = self.match_sell(&input)?;
        self.sells.push(sell);
        Ok(&self.sells[self.sells.len() - 1])
    }

    /// Match a sale and return its full lot breakdown alongside the record.
    pub fn add_sell_detailed(
        &mut self,
        input: TradeInput,
    ) -> Result<(SellRecord, FifoMatch), LedgerError> {
        let (sell, matched) = self.match_sell(&input)?;
        self.sells.push(sell.clone());
        Ok((sell, matched))
    }

    /// Validate, match, and price a sale. Lots are only drawn down once the
    /// record has been built, so every failure leaves them untouched.
    fn match_sell(&mut self, input: &TradeInput) -> Result<(SellRecord, FifoMatch), LedgerError> {
        input.validate()?;
        let mut buys = self.buys.clone();
        let matched = fifo::match_fifo(&mut buys, input.amount)?;
        let sell = SellRecord::new(input, matched.cost_basis)?;
        self.buys = buys;
        debug!(
            date = %sell.date,
            amount = %sell.amount,
            cost_basis = %sell.cost_basis,
            gain_loss = %sell.gain_loss,
            "matched sell"
        );
        Ok((sell, matched))
    }

    fn check_index(&self, kind: TransactionKind, index: usize) -> Result<(), LedgerError> {
        let len = self.len(kind);
        if index < len {
            Ok(())
        } else {
            Err(LedgerError::IndexOutOfRange { kind, index, len })
        }
    }

    /// Replace the record at `index` with one rebuilt from `input`.
    ///
    /// A buy edit yields a fresh lot whose `remaining` equals the new amount.
    /// A sell edit re-runs FIFO against the current lots, which still carry
    /// the deductions of the sell being replaced. Returns the new record.
    pub fn edit_transaction(
        &mut self,
        kind: TransactionKind,
        index: usize,
        input: TradeInput,
    ) -> Result<Transaction, LedgerError> {
        self.check_index(kind, index)?;
        match kind {
            TransactionKind::Buy => {
                input.validate()?;
                let lot = BuyLot::new(&input);
                self.buys[index] = lot.clone();
                debug!(index, "edited buy");
                Ok(Transaction::Buy(lot))
            }
            TransactionKind::Sell => {
                let (sell, _) = self.match_sell(&input)?;
                self.sells[index] = sell.clone();
                debug!(index, "edited sell");
                Ok(Transaction::Sell(sell))
            }
        }
    }

    /// Remove and return the record at `index`.
    ///
    /// Removing a sell does not give its quantity back to the lots.
    pub fn delete_transaction(
        &mut self,
        kind: TransactionKind,
        index: usize,
    ) -> Result<Transaction, LedgerError> {
        self.check_index(kind, index)?;
        let removed = match kind {
            TransactionKind::Buy => Transaction::Buy(self.buys.remove(index)),
            TransactionKind::Sell => Transaction::Sell(self.sells.remove(index)),
        };
        debug!(%kind, index, "deleted transaction");
        Ok(removed)
    }

    /// Remove every sell and restore every lot to its full amount.
    pub fn clear_sells(&mut self) {
        self.sells.clear();
        for lot in &mut self.buys {
            lot.reset();
        }
        info!(lots = self.buys.len(), "cleared sells");
    }

    /// Remove every buy. Sells are kept as recorded.
    pub fn clear_buys(&mut self) {
        self.buys.clear();
        info!(sells = self.sells.len(), "cleared buys");
    }

    /// Re-derive every lot's `remaining` and every sell's cost basis by
    /// replaying all sells, in order, against fully restored lots.
    ///
    /// The replay runs on a copy; if any sell no longer fits, the ledger is
    /// left unchanged and [`LedgerError::Unmatchable`] names that sell.
    pub fn rebuild(&mut self) -> Result<(), LedgerError> {
        let mut buys = self.buys.clone();
        for lot in &mut buys {
            lot.reset();
        }

        let mut sells = Vec::with_capacity(self.sells.len());
        for (index, sell) in self.sells.iter().enumerate() {
            let input = sell.input();
            let matched = fifo::match_fifo(&mut buys, input.amount).map_err(|e| match e {
                LedgerError::InsufficientInventory {
                    requested,
                    available,
                } => LedgerError::Unmatchable {
                    index,
                    requested,
                    available,
                },
                other => other,
            })?;
            sells.push(SellRecord::new(&input, matched.cost_basis)?);
        }

        self.buys = buys;
        self.sells = sells;
        info!(sells = self.sells.len(), "rebuilt ledger");
        Ok(())
    }

    /// Total realized gains, losses, and net across all sells.
    #[must_use]
    pub fn compute_aggregates(&self) -> Aggregates {
        // Saturating: the totals of in-bounds sells never get near the limit.
        let total_gains = self
            .sells
            .iter()
            .filter(|s| s.is_gain())
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.gain_loss));
        let total_losses = self
            .sells
            .iter()
            .filter(|s| s.is_loss())
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.gain_loss));

        Aggregates {
            total_gains,
            total_losses,
            net_gain: total_gains.saturating_add(total_losses),
        }
    }
}
