//! A ledger bound to a store.
//!
//! [`Session`] loads the ledger once when opened and writes it back after every
//! successful mutation. A rejected mutation changes nothing and writes nothing.
//! If the write itself fails, the in-memory ledger keeps the mutation and the
//! error is returned so the host can retry with [`Session::flush`].

use btcledger_core::{
    Aggregates, BuyLot, Ledger, LedgerError, SellRecord, TradeInput, Transaction,
    TransactionKind,
};
use thiserror::Error;
use tracing::info;

use crate::{load, save, Store, StoreError, StoreOptions};

/// Errors from a [`Session`] operation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The ledger could not be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A ledger that persists itself after each mutation.
#[derive(Debug)]
pub struct Session<S: Store> {
    store: S,
    options: StoreOptions,
    ledger: Ledger,
}

impl<S: Store> Session<S> {
    /// Load the ledger under `options.key` from `store`.
    pub fn open(store: S, options: StoreOptions) -> Result<Self, StoreError> {
        let ledger = load(&store, &options.key)?;
        info!(
            key = %options.key,
            buys = ledger.buys().len(),
            sells = ledger.sells().len(),
            "opened ledger"
        );
        Ok(Self {
            store,
            options,
            ledger,
        })
    }

    /// The current ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The options this session was opened with.
    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the store, dropping the in-memory ledger.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Write the current ledger to the store.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        save(&mut self.store, &self.ledger, &self.options)
    }

    /// Add a buy and save.
    pub fn add_buy(&mut self, input: TradeInput) -> Result<BuyLot, SessionError> {
        let lot = self.ledger.add_buy(input)?.clone();
        self.flush()?;
        Ok(lot)
    }

    /// Add a sell and save.
    pub fn add_sell(&mut self, input: TradeInput) -> Result<SellRecord, SessionError> {
        let sell = self.ledger.add_sell(input)?.clone();
        self.flush()?;
        Ok(sell)
    }

    /// Edit a transaction and save.
    pub fn edit_transaction(
        &mut self,
        kind: TransactionKind,
        index: usize,
        input: TradeInput,
    ) -> Result<Transaction, SessionError> {
        let edited = self.ledger.edit_transaction(kind, index, input)?;
        self.flush()?;
        Ok(edited)
    }

    /// Delete a transaction and save.
    pub fn delete_transaction(
        &mut self,
        kind: TransactionKind,
        index: usize,
    ) -> Result<Transaction, SessionError> {
        let removed = self.ledger.delete_transaction(kind, index)?;
        self.flush()?;
        Ok(removed)
    }

    /// Clear every sell, restore every lot, and save.
    pub fn clear_sells(&mut self) -> Result<(), SessionError> {
        self.ledger.clear_sells();
        self.flush()?;
        Ok(())
    }

    /// Clear every buy and save.
    pub fn clear_buys(&mut self) -> Result<(), SessionError> {
        self.ledger.clear_buys();
        self.flush()?;
        Ok(())
    }

    /// Replay every sell against restored lots and save.
    pub fn rebuild(&mut self) -> Result<(), SessionError> {
        self.ledger.rebuild()?;
        self.flush()?;
        Ok(())
    }

    /// Realized totals of the current ledger.
    #[must_use]
    pub fn compute_aggregates(&self) -> Aggregates {
        self.ledger.compute_aggregates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, DEFAULT_KEY};
    use rust_decimal_macros::dec;

    fn trade(date: &str, amount: &str, price: &str) -> TradeInput {
        TradeInput::parse(date, amount, price, "0").unwrap()
    }

    /// A store whose writes always fail.
    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    impl Store for ReadOnlyStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn write(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey {
                key: key.to_string(),
            })
        }
    }

    #[test]
    fn test_every_mutation_is_saved() {
        let mut session = Session::open(MemoryStore::new(), StoreOptions::default()).unwrap();
        session.add_buy(trade("2024-01-01", "1", "10000")).unwrap();
        assert!(session.store().get(DEFAULT_KEY).is_some());

        session.add_sell(trade("2024-02-01", "0.4", "20000")).unwrap();
        let reopened = Session::open(session.store().clone(), StoreOptions::default()).unwrap();
        assert_eq!(reopened.ledger(), session.ledger());
        assert_eq!(reopened.ledger().available(), dec!(0.6));
    }

    #[test]
    fn test_rejected_sell_writes_nothing() {
        let mut session = Session::open(MemoryStore::new(), StoreOptions::default()).unwrap();
        let err = session
            .add_sell(trade("2024-02-01", "1", "20000"))
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Ledger(LedgerError::InsufficientInventory { .. })
        ));
        assert!(session.store().get(DEFAULT_KEY).is_none());
    }

    #[test]
    fn test_failed_save_keeps_mutation() {
        let mut session = Session::open(ReadOnlyStore, StoreOptions::default()).unwrap();
        let err = session
            .add_buy(trade("2024-01-01", "1", "10000"))
            .unwrap_err();

        assert!(matches!(err, SessionError::Store(_)));
        assert_eq!(session.ledger().buys().len(), 1);
    }

    #[test]
    fn test_custom_key() {
        let options = StoreOptions::new().with_key("ledger-2024");
        let mut session = Session::open(MemoryStore::new(), options).unwrap();
        session.add_buy(trade("2024-01-01", "1", "10000")).unwrap();

        let store = session.into_store();
        assert!(store.get("ledger-2024").is_some());
        assert!(store.get(DEFAULT_KEY).is_none());
    }
}
